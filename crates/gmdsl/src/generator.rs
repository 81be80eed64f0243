//! Plugin contract for generators.
//!
//! A [`Generator`] turns a [`ValidatedModel`] into an ordered list of
//! [`Artifact`]s, each a relative path and a text payload. Generators are
//! looked up by name in a [`GeneratorRegistry`] value owned by the
//! embedding application; there is no global registry.
//!
//! Generators see the model read-only and must not re-validate it. A
//! `type` without a body marks a primitive; mapping primitives to a
//! target's native types is the generator's own business, typically
//! driven by its [`GeneratorOptions`].

pub mod debug;

use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info};
use thiserror::Error;

use gmdsl_parser::validate::ValidatedModel;

/// Errors raised by the registry and by generators.
#[derive(Debug, Clone, Error)]
pub enum GenerateError {
    #[error("unknown generator `{name}` (available: {available})")]
    UnknownGenerator { name: String, available: String },

    #[error("generator `{0}` is already registered")]
    DuplicateGenerator(String),

    #[error("invalid option `{key}`: {message}")]
    InvalidOption { key: String, message: String },

    #[error("invalid artifact path `{path}`: {reason}")]
    InvalidArtifactPath { path: String, reason: &'static str },

    #[error("{0}")]
    Failed(String),
}

/// Generator-specific options, the `[generators.<name>]` table of the
/// configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratorOptions {
    table: toml::Table,
}

impl GeneratorOptions {
    pub fn new(table: toml::Table) -> Self {
        Self { table }
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The raw option table.
    pub fn table(&self) -> &toml::Table {
        &self.table
    }

    /// A string option.
    ///
    /// # Errors
    ///
    /// Fails if the key is present with a non-string value.
    pub fn get_str(&self, key: &str) -> Result<Option<&str>, GenerateError> {
        self.table
            .get(key)
            .map(|value| value.as_str().ok_or_else(|| invalid_type(key, "a string")))
            .transpose()
    }

    /// A boolean option.
    ///
    /// # Errors
    ///
    /// Fails if the key is present with a non-boolean value.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, GenerateError> {
        self.table
            .get(key)
            .map(|value| value.as_bool().ok_or_else(|| invalid_type(key, "a boolean")))
            .transpose()
    }
}

fn invalid_type(key: &str, expected: &str) -> GenerateError {
    GenerateError::InvalidOption {
        key: key.to_string(),
        message: format!("expected {expected}"),
    }
}

/// One generated output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    path: PathBuf,
    content: String,
}

impl Artifact {
    /// Create an artifact at a path relative to the output directory.
    ///
    /// # Errors
    ///
    /// Rejects empty paths, absolute paths and paths with `..` components.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Result<Self, GenerateError> {
        let path = path.into();
        let invalid = |reason| GenerateError::InvalidArtifactPath {
            path: path.display().to_string(),
            reason,
        };

        if path.as_os_str().is_empty() {
            return Err(invalid("path is empty"));
        }
        for component in path.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                Component::ParentDir => return Err(invalid("`..` is not allowed")),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(invalid("path must be relative"));
                }
            }
        }

        Ok(Self {
            path,
            content: content.into(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// A named code generator.
pub trait Generator: Send + Sync {
    /// One-line description shown in generator listings.
    fn description(&self) -> &str;

    /// Produce the artifacts for `model`.
    ///
    /// # Errors
    ///
    /// Fails on unusable options or if generation itself fails.
    fn generate(
        &self,
        model: &ValidatedModel,
        options: &GeneratorOptions,
    ) -> Result<Vec<Artifact>, GenerateError>;
}

/// Generators by name, in registration order.
///
/// Filled once by the embedding application, then only read.
#[derive(Default)]
pub struct GeneratorRegistry {
    generators: IndexMap<String, Box<dyn Generator>>,
}

impl GeneratorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the generators shipped with this crate.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .generators
            .insert(debug::NAME.to_string(), Box::new(debug::DebugGenerator));
        registry
    }

    /// Register `generator` under `name`.
    ///
    /// # Errors
    ///
    /// Fails if `name` is already taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        generator: impl Generator + 'static,
    ) -> Result<(), GenerateError> {
        let name = name.into();
        if self.generators.contains_key(&name) {
            return Err(GenerateError::DuplicateGenerator(name));
        }
        debug!(generator = name.as_str(); "Registering generator");
        self.generators.insert(name, Box::new(generator));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Generator> {
        self.generators.get(name).map(Box::as_ref)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.generators.keys().map(String::as_str)
    }

    /// Registered generators with their names.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Generator)> {
        self.generators
            .iter()
            .map(|(name, generator)| (name.as_str(), generator.as_ref()))
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Run the generator registered as `name` over `model`.
///
/// # Errors
///
/// Fails with [`GenerateError::UnknownGenerator`] if nothing is registered
/// under `name`, or with whatever the generator reports.
pub fn generate(
    registry: &GeneratorRegistry,
    name: &str,
    model: &ValidatedModel,
    options: &GeneratorOptions,
) -> Result<Vec<Artifact>, GenerateError> {
    let generator = registry
        .get(name)
        .ok_or_else(|| GenerateError::UnknownGenerator {
            name: name.to_string(),
            available: registry.names().collect::<Vec<_>>().join(", "),
        })?;

    info!(generator = name; "Generating artifacts");
    let artifacts = generator.generate(model, options)?;
    for artifact in &artifacts {
        debug!(path = artifact.path().display().to_string(), bytes = artifact.content().len(); "Artifact generated");
    }
    info!(generator = name, artifacts_len = artifacts.len(); "Generation completed");

    Ok(artifacts)
}

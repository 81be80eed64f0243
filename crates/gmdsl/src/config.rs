//! Configuration types for gmdsl processing.
//!
//! All types implement [`serde::Deserialize`] and every section is
//! optional, so an empty TOML document is a valid configuration.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration.
//! - [`ImportsConfig`] - Where imported namespaces are searched for.
//! - [`ValidationConfig`] - Adjustable validation rules.
//! - `[generators.<name>]` - Free-form options handed to one generator.
//!
//! # Example
//!
//! ```
//! # use gmdsl::config::AppConfig;
//! let config: AppConfig = toml::from_str(r#"
//!     [imports]
//!     search_paths = ["schemas"]
//!
//!     [validation]
//!     allow_partial_annotation_arguments = false
//!
//!     [generators.debug]
//!     show_properties = false
//! "#).unwrap();
//!
//! assert_eq!(config.imports().search_paths().len(), 1);
//! assert!(!config.validation().policy().allow_partial_annotation_arguments);
//! ```

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use gmdsl_parser::validate::ValidationPolicy;

use crate::generator::GeneratorOptions;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    imports: ImportsConfig,

    #[serde(default)]
    validation: ValidationConfig,

    /// Per-generator option tables, keyed by generator name.
    #[serde(default)]
    generators: BTreeMap<String, toml::Table>,
}

impl AppConfig {
    pub fn new(imports: ImportsConfig, validation: ValidationConfig) -> Self {
        Self {
            imports,
            validation,
            generators: BTreeMap::new(),
        }
    }

    /// Set the option table for generator `name`.
    pub fn with_generator_options(mut self, name: impl Into<String>, options: toml::Table) -> Self {
        self.generators.insert(name.into(), options);
        self
    }

    pub fn imports(&self) -> &ImportsConfig {
        &self.imports
    }

    pub fn validation(&self) -> &ValidationConfig {
        &self.validation
    }

    /// Options for generator `name`; empty when none are configured.
    pub fn generator_options(&self, name: &str) -> GeneratorOptions {
        self.generators
            .get(name)
            .cloned()
            .map(GeneratorOptions::new)
            .unwrap_or_default()
    }
}

/// `[imports]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportsConfig {
    /// Directories searched for imported namespaces after the importing
    /// file's own directory, in order.
    #[serde(default)]
    search_paths: Vec<PathBuf>,
}

impl ImportsConfig {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Append `paths` after the configured search paths.
    pub fn extend<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.search_paths
            .extend(paths.into_iter().map(|path| path.as_ref().to_path_buf()));
    }
}

/// `[validation]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_true")]
    allow_partial_annotation_arguments: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            allow_partial_annotation_arguments: true,
        }
    }
}

impl ValidationConfig {
    pub fn new(allow_partial_annotation_arguments: bool) -> Self {
        Self {
            allow_partial_annotation_arguments,
        }
    }

    /// The validator policy this section describes.
    pub fn policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            allow_partial_annotation_arguments: self.allow_partial_annotation_arguments,
        }
    }
}

//! gmdsl - a graph schema language.
//!
//! Parses gmdsl source, resolves its imports, validates every
//! cross-reference and hands the validated model to named generators.

pub mod config;

mod error;
pub mod generator;

pub use gmdsl_core::{identifier, model, span};
pub use gmdsl_parser::{
    error::{Diagnostic, ErrorCode, ErrorKind, FrontendError, Label, Severity},
    dropped_comments, print_document,
    resolve::{LoadError, MemoryLoader, NamespaceLoader, ResolvedModel},
    validate::{ValidatedModel, ValidationPolicy},
};

pub use error::{GmdslError, Sources};

use log::{debug, info, trace};

use config::AppConfig;
use generator::{Artifact, GeneratorRegistry};
use model::Document;

/// Builder for parsing, validating and generating from gmdsl models.
///
/// # Examples
///
/// ```rust
/// use gmdsl::{MemoryLoader, ModelBuilder, config::AppConfig, generator::GeneratorRegistry};
///
/// let source = r#"
///     type Float
///     type Point { x: Float y: Float }
///     node Place { at: Point }
/// "#;
///
/// let builder = ModelBuilder::new(AppConfig::default());
///
/// // Parse, resolve and validate
/// let model = builder
///     .build(source, None, &mut MemoryLoader::new())
///     .expect("Failed to build model");
///
/// // Run a generator
/// let registry = GeneratorRegistry::with_builtins();
/// let artifacts = builder
///     .generate(&registry, "debug", &model)
///     .expect("Failed to generate");
/// assert_eq!(artifacts.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ModelBuilder {
    config: AppConfig,
}

impl ModelBuilder {
    /// Create a new model builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse source text into a document.
    ///
    /// `origin` names where the text came from (usually a path); it is
    /// recorded on the document and on any diagnostics.
    ///
    /// # Errors
    ///
    /// Returns `GmdslError::Diagnostics` for lexical and syntax errors.
    pub fn parse(&self, source: &str, origin: Option<&str>) -> Result<Document, GmdslError> {
        info!(origin:?; "Parsing document");

        let result = match origin {
            Some(origin) => gmdsl_parser::parse_with_origin(source, origin),
            None => gmdsl_parser::parse(source),
        };
        let document =
            result.map_err(|err| GmdslError::new_diagnostics(err, source, origin))?;

        debug!("Document parsed successfully");
        trace!(document:?; "Parsed document");
        Ok(document)
    }

    /// Parse `source`, resolve its imports through `loader` and validate
    /// the result with the configured policy.
    ///
    /// # Errors
    ///
    /// Returns `GmdslError::Diagnostics` holding the syntax error, the
    /// fatal resolution error, or every validation error found. Its
    /// sources contain the root text only; callers that loaded imports
    /// may add theirs with [`Sources::insert`].
    pub fn build<L: NamespaceLoader + ?Sized>(
        &self,
        source: &str,
        origin: Option<&str>,
        loader: &mut L,
    ) -> Result<ValidatedModel, GmdslError> {
        let document = self.parse(source, origin)?;

        info!("Resolving imports");
        let resolved = gmdsl_parser::resolve::resolve(document, loader)
            .map_err(|err| GmdslError::new_diagnostics(err.with_origin(origin), source, origin))?;
        debug!(namespaces_len = resolved.namespaces().count(); "Imports resolved");

        info!("Validating model");
        let policy = self.config.validation().policy();
        let model = ValidatedModel::new(resolved, &policy)
            .map_err(|err| GmdslError::new_diagnostics(err, source, origin))?;

        info!(declarations_len = model.declarations().count(); "Model validated successfully");
        Ok(model)
    }

    /// Run generator `name` with its configured `[generators.<name>]`
    /// options.
    ///
    /// # Errors
    ///
    /// Returns `GmdslError::Generate` for unknown generators and generator
    /// failures.
    pub fn generate(
        &self,
        registry: &GeneratorRegistry,
        name: &str,
        model: &ValidatedModel,
    ) -> Result<Vec<Artifact>, GmdslError> {
        let options = self.config.generator_options(name);
        Ok(generator::generate(registry, name, model, &options)?)
    }
}

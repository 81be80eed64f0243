//! gmdsl CLI library
//!
//! This module contains the command logic behind the `gmdsl` binary.

pub mod error_adapter;

mod args;
mod config;
mod loader;

pub use args::{Args, Command};
pub use loader::FileLoader;

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use gmdsl::{
    GmdslError, ModelBuilder, Severity, Sources, ValidatedModel, config::ImportsConfig,
    dropped_comments, generator::GeneratorRegistry, print_document,
};

use error_adapter::{DiagnosticAdapter, Reportable};

/// Run the gmdsl CLI application, writing command output to stdout.
///
/// # Errors
///
/// Returns `GmdslError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Syntax, resolution and validation diagnostics
/// - Generator errors
pub fn run(args: &Args) -> Result<(), GmdslError> {
    run_with_output(args, &mut io::stdout().lock())
}

/// Run the gmdsl CLI application, writing command output to `out`.
///
/// # Errors
///
/// See [`run`].
pub fn run_with_output(args: &Args, out: &mut impl Write) -> Result<(), GmdslError> {
    let app_config = config::load_config(args.config.as_ref())?;
    let registry = GeneratorRegistry::with_builtins();

    match &args.command {
        Command::Validate { input, include } => {
            let builder = ModelBuilder::new(app_config);
            let model = build_model(&builder, input, include)?;
            writeln!(
                out,
                "{}: ok ({} namespaces, {} declarations)",
                input.display(),
                model.model().namespaces().count(),
                model.declarations().count()
            )?;
        }
        Command::Generate {
            input,
            generator,
            output,
            include,
        } => {
            let builder = ModelBuilder::new(app_config);
            let model = build_model(&builder, input, include)?;
            let artifacts = builder.generate(&registry, generator, &model)?;

            for artifact in &artifacts {
                let path = output.join(artifact.path());
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, artifact.content())?;
                writeln!(out, "wrote {}", path.display())?;
            }
            info!(
                output_dir = output.display().to_string(),
                artifacts_len = artifacts.len();
                "Artifacts written"
            );
        }
        Command::Fmt { input, write } => {
            let source = fs::read_to_string(input)?;
            let origin = input.display().to_string();
            let document = ModelBuilder::new(app_config).parse(&source, Some(&origin))?;
            let formatted = print_document(&document);

            let severity = if *write {
                Severity::Error
            } else {
                Severity::Warning
            };
            let dropped = dropped_comments(&source, severity)
                .map_err(|err| GmdslError::new_diagnostics(err, source.as_str(), Some(&origin)))?
                .map(|diagnostic| diagnostic.with_origin(Some(&origin)));

            match dropped {
                Some(diagnostic) if *write => {
                    let diagnostic = diagnostic.with_help(
                        "move the comments out of the file, or run without `--write` to print the result",
                    );
                    return Err(GmdslError::new_diagnostics(
                        diagnostic.into(),
                        source,
                        Some(&origin),
                    ));
                }
                Some(diagnostic) => {
                    let sources = Sources::new(source.as_str(), Some(&origin));
                    let report = Reportable::Diagnostic(DiagnosticAdapter::new(&diagnostic, &sources));
                    warn!("{}", error_adapter::render(&report));
                }
                None => {}
            }

            if !*write {
                write!(out, "{formatted}")?;
            } else if formatted != source {
                fs::write(input, &formatted)?;
                info!(path = origin.as_str(); "Formatted file");
            } else {
                debug!(path = origin.as_str(); "File already formatted");
            }
        }
        Command::Generators => {
            for (name, generator) in registry.iter() {
                writeln!(out, "{name:<12} {}", generator.description())?;
            }
        }
    }

    Ok(())
}

/// Parse, resolve and validate `input`. Imports are searched next to the
/// importing file, then in the configured search paths, then in `include`.
fn build_model(
    builder: &ModelBuilder,
    input: &Path,
    include: &[PathBuf],
) -> Result<ValidatedModel, GmdslError> {
    info!(input_path = input.display().to_string(); "Processing schema");

    let source = fs::read_to_string(input)?;
    let origin = input.display().to_string();

    let mut imports = ImportsConfig::new(builder.config().imports().search_paths().to_vec());
    imports.extend(include);
    debug!(search_paths:? = imports.search_paths(); "Import search paths");

    let mut loader = FileLoader::new(source_dir(input), imports.search_paths().to_vec());
    builder
        .build(&source, Some(&origin), &mut loader)
        .map_err(|err| with_loaded_sources(err, &loader))
}

fn source_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Attach the texts of imported files so diagnostics pointing into them
/// render with context.
fn with_loaded_sources(err: GmdslError, loader: &FileLoader) -> GmdslError {
    match err {
        GmdslError::Diagnostics { err, mut sources } => {
            for (origin, text) in loader.texts() {
                sources.insert(origin, text);
            }
            GmdslError::Diagnostics { err, sources }
        }
        other => other,
    }
}

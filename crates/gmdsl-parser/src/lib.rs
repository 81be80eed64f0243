//! # gmdsl Parser
//!
//! Front end for the gmdsl graph schema language: lexing, parsing, model
//! building, namespace/import resolution and validation.
//!
//! ## Usage
//!
//! ```
//! # use gmdsl_parser::{parse, resolve::{resolve, MemoryLoader}, validate::{ValidatedModel, ValidationPolicy}};
//! # use gmdsl_parser::error::FrontendError;
//!
//! fn main() -> Result<(), FrontendError> {
//!     let source = r#"
//!         type Float
//!         type Point { x: Float y: Float }
//!         node Place { at: Point }
//!     "#;
//!
//!     let document = parse(source)?;
//!     let resolved = resolve(document, &mut MemoryLoader::new())?;
//!     let model = ValidatedModel::new(resolved, &ValidationPolicy::default())?;
//!     assert_eq!(model.declarations().count(), 3);
//!     Ok(())
//! }
//! ```
//!
//! Parsing is fail-fast: the first lexical or syntax error aborts the
//! document. Resolution stops at the first missing namespace or import
//! cycle. Validation is fail-slow and reports every problem at once.

mod build;
pub mod error;
mod lexer;
mod parser;
mod parser_types;
mod printer;
pub mod resolve;
mod tokens;
pub mod validate;

pub use gmdsl_core::span::Span;
pub use printer::{dropped_comments, print_document};

use log::{debug, info};

use gmdsl_core::model::Document;

use build::Builder;
use error::FrontendError;

/// Parse source text into a [`Document`].
///
/// This is the main entry point for parsing gmdsl source code. It runs:
///
/// 1. **Tokenize** - Convert source text to significant tokens
/// 2. **Parse** - Build the parse tree from tokens
/// 3. **Build** - Lower the parse tree into the immutable model
///
/// # Errors
///
/// Returns a [`FrontendError`] holding the single diagnostic that stopped
/// parsing.
pub fn parse(source: &str) -> Result<Document, FrontendError> {
    info!(source_len = source.len(); "Parsing document");

    // Step 1: Tokenize
    let tokens = lexer::tokenize(source)?;
    debug!(tokens_len = tokens.len(); "Tokenized source");

    // Step 2: Parse
    let tree = parser::build_document(&tokens)?;

    // Step 3: Build
    let document = Builder::new().build(tree)?;
    debug!(declarations_len = document.declarations().len(); "Document built");
    Ok(document)
}

/// Like [`parse`], recording `origin` on the document and on any
/// diagnostics.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_with_origin(source: &str, origin: &str) -> Result<Document, FrontendError> {
    parse(source)
        .map(|document| document.with_origin(origin))
        .map_err(|err| err.with_origin(Some(origin)))
}

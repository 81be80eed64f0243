//! Error types for gmdsl operations.
//!
//! This module provides the main error type [`GmdslError`] which wraps
//! the error conditions that can occur while building and generating
//! from a model.

use std::{collections::HashMap, io};

use thiserror::Error;

use gmdsl_parser::error::FrontendError;

use crate::generator::GenerateError;

/// The main error type for gmdsl operations.
///
/// # Diagnostic Variants
///
/// The `Diagnostics` variant carries the front end's diagnostics together
/// with the source texts their spans point into, so callers can render
/// them with context.
#[derive(Debug, Error)]
pub enum GmdslError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Diagnostics { err: FrontendError, sources: Sources },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generation error: {0}")]
    Generate(#[from] GenerateError),
}

impl GmdslError {
    /// Create a new `Diagnostics` error for a document read from `src`.
    pub fn new_diagnostics(err: FrontendError, src: impl Into<String>, origin: Option<&str>) -> Self {
        Self::Diagnostics {
            err,
            sources: Sources::new(src, origin),
        }
    }
}

/// Source texts diagnostics may point into.
///
/// A diagnostic without an origin points into the root document.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    root: String,
    root_origin: Option<String>,
    named: HashMap<String, String>,
}

impl Sources {
    pub fn new(root: impl Into<String>, root_origin: Option<&str>) -> Self {
        Self {
            root: root.into(),
            root_origin: root_origin.map(str::to_owned),
            named: HashMap::new(),
        }
    }

    /// Register the text of another document, keyed by its origin.
    pub fn insert(&mut self, origin: impl Into<String>, text: impl Into<String>) {
        self.named.insert(origin.into(), text.into());
    }

    /// The text for a diagnostic origin.
    pub fn get(&self, origin: Option<&str>) -> Option<&str> {
        match origin {
            None => Some(&self.root),
            Some(origin) if self.root_origin.as_deref() == Some(origin) => Some(&self.root),
            Some(origin) => self.named.get(origin).map(String::as_str),
        }
    }
}

//! Error and diagnostic system for the gmdsl front end.
//!
//! This module provides an error handling system with:
//! - Error codes grouped by phase, each mapped to one [`ErrorKind`]
//! - Multiple labeled spans for rich error context
//! - Severity levels
//! - Diagnostic collector for accumulating multiple errors
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, multiple source
//! locations, and help text. Multiple diagnostics are wrapped in
//! [`FrontendError`] for returning from lexing, parsing, import resolution
//! and validation.
//!
//! # Example
//!
//! ```
//! # use gmdsl_parser::error::{Diagnostic, ErrorCode};
//! # use gmdsl_parser::Span;
//!
//! let span = Span::new(100..120);
//! let original_span = Span::new(50..70);
//!
//! let diag = Diagnostic::error("type `Address` is declared multiple times")
//!     .with_code(ErrorCode::E300)
//!     .with_label(span, "duplicate declaration")
//!     .with_secondary_label(original_span, "first declared here")
//!     .with_help("remove the duplicate or use a different name");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod frontend_error;
mod label;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::{ErrorCode, ErrorKind};
pub use frontend_error::FrontendError;
pub use label::{Label, LabelStyle};
pub use severity::Severity;

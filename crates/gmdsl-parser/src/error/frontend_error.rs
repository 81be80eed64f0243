//! The FrontendError type for wrapping diagnostics.
//!
//! [`FrontendError`] wraps one or more [`Diagnostic`]s produced while
//! lexing, parsing, resolving imports or validating.

use std::fmt;

use crate::error::{Diagnostic, ErrorKind};

/// Error type for the front end.
///
/// Wraps one or more diagnostics.
#[derive(Debug, Clone)]
pub struct FrontendError {
    diagnostics: Vec<Diagnostic>,
}

impl FrontendError {
    /// Create a new error from diagnostics.
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Get all diagnostics in this error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the error, returning its diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Returns `true` if any diagnostic has the given kind.
    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.kind() == Some(kind))
    }

    /// Attach `origin` to every diagnostic that has none yet.
    pub fn with_origin(self, origin: Option<&str>) -> Self {
        Self {
            diagnostics: self
                .diagnostics
                .into_iter()
                .map(|diagnostic| diagnostic.with_origin(origin))
                .collect(),
        }
    }
}

impl fmt::Display for FrontendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(first) = self.diagnostics.first() {
            write!(f, "{}", first)?;
            if self.diagnostics.len() > 1 {
                write!(f, " (+{} more)", self.diagnostics.len() - 1)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FrontendError {}

impl From<Diagnostic> for FrontendError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<Vec<Diagnostic>> for FrontendError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_from_diagnostic() {
        let err: FrontendError = Diagnostic::error("test error")
            .with_code(ErrorCode::E301)
            .into();

        assert_eq!(err.diagnostics().len(), 1);
        assert!(err.has_kind(ErrorKind::UnresolvedReference));
        assert!(!err.has_kind(ErrorKind::ImportCycle));
    }

    #[test]
    fn test_display_single() {
        let err: FrontendError = Diagnostic::error("unresolved reference").into();

        assert_eq!(err.to_string(), "error: unresolved reference");
    }

    #[test]
    fn test_display_multiple() {
        let err: FrontendError = vec![
            Diagnostic::error("first error"),
            Diagnostic::error("second error"),
            Diagnostic::error("third error"),
        ]
        .into();

        assert_eq!(err.to_string(), "error: first error (+2 more)");
    }

    #[test]
    fn test_with_origin_keeps_existing() {
        let err: FrontendError = vec![
            Diagnostic::error("a"),
            Diagnostic::error("b").with_origin(Some("other.gm")),
        ]
        .into();
        let err = err.with_origin(Some("main.gm"));

        assert_eq!(err.diagnostics()[0].origin(), Some("main.gm"));
        assert_eq!(err.diagnostics()[1].origin(), Some("other.gm"));
    }
}

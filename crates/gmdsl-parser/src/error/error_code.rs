//! Error codes for the gmdsl diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser and model builder errors
//! - `E2xx` - Import resolution errors
//! - `E3xx` - Validation errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A string was opened with a quote but never closed on the same line.
    E001,

    /// Unexpected character.
    ///
    /// A character was encountered that starts no token.
    E002,

    /// Invalid escape sequence.
    ///
    /// Valid escapes are: `\n`, `\r`, `\t`, `\\`, `\"`.
    E003,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// The parser encountered a token it did not expect at this position.
    E100,

    /// Unexpected end of input.
    ///
    /// The input ended before a complete declaration was parsed.
    E101,

    /// Duplicate namespace declaration.
    ///
    /// A document declares its namespace more than once.
    E102,

    // =========================================================================
    // Import Resolution Errors (E2xx)
    // =========================================================================
    /// Namespace not found.
    ///
    /// An imported namespace could not be loaded.
    E200,

    /// Import cycle.
    ///
    /// A namespace was imported again while it was still being resolved.
    E201,

    // =========================================================================
    // Validation Errors (E3xx)
    // =========================================================================
    /// Duplicate declaration.
    ///
    /// Two declarations of the same kind share a name in one resolution scope.
    E300,

    /// Unresolved reference.
    ///
    /// A type, node or annotation reference has no matching declaration.
    E301,

    /// Annotation argument count mismatch.
    ///
    /// An annotation usage supplies more arguments than the annotation
    /// declares parameters.
    E302,
}

/// The error taxonomy callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SyntaxError,
    NamespaceNotFound,
    ImportCycle,
    DuplicateDeclaration,
    UnresolvedReference,
    ArgumentArityError,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            // Parser errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            // Import resolution errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            // Validation errors
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid escape sequence",
            // Parser errors
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "unexpected end of input",
            ErrorCode::E102 => "duplicate namespace declaration",
            // Import resolution errors
            ErrorCode::E200 => "namespace not found",
            ErrorCode::E201 => "import cycle",
            // Validation errors
            ErrorCode::E300 => "duplicate declaration",
            ErrorCode::E301 => "unresolved reference",
            ErrorCode::E302 => "annotation argument count mismatch",
        }
    }

    /// The taxonomy kind this code belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::E001
            | ErrorCode::E002
            | ErrorCode::E003
            | ErrorCode::E100
            | ErrorCode::E101
            | ErrorCode::E102 => ErrorKind::SyntaxError,
            ErrorCode::E200 => ErrorKind::NamespaceNotFound,
            ErrorCode::E201 => ErrorKind::ImportCycle,
            ErrorCode::E300 => ErrorKind::DuplicateDeclaration,
            ErrorCode::E301 => ErrorKind::UnresolvedReference,
            ErrorCode::E302 => ErrorKind::ArgumentArityError,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ErrorKind {
    /// Returns `true` if a diagnostic of this kind aborts its phase.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ErrorKind::SyntaxError | ErrorKind::NamespaceNotFound | ErrorKind::ImportCycle
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::NamespaceNotFound => "NamespaceNotFound",
            ErrorKind::ImportCycle => "ImportCycle",
            ErrorKind::DuplicateDeclaration => "DuplicateDeclaration",
            ErrorKind::UnresolvedReference => "UnresolvedReference",
            ErrorKind::ArgumentArityError => "ArgumentArityError",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E200.to_string(), "E200");
        assert_eq!(ErrorCode::E300.to_string(), "E300");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E001.description(), "unterminated string literal");
        assert_eq!(ErrorCode::E201.description(), "import cycle");
        assert_eq!(ErrorCode::E300.description(), "duplicate declaration");
    }

    #[test]
    fn test_error_code_kind() {
        assert_eq!(ErrorCode::E002.kind(), ErrorKind::SyntaxError);
        assert_eq!(ErrorCode::E102.kind(), ErrorKind::SyntaxError);
        assert_eq!(ErrorCode::E200.kind(), ErrorKind::NamespaceNotFound);
        assert_eq!(ErrorCode::E201.kind(), ErrorKind::ImportCycle);
        assert_eq!(ErrorCode::E300.kind(), ErrorKind::DuplicateDeclaration);
        assert_eq!(ErrorCode::E301.kind(), ErrorKind::UnresolvedReference);
        assert_eq!(ErrorCode::E302.kind(), ErrorKind::ArgumentArityError);
    }

    #[test]
    fn test_fatal_kinds() {
        assert!(ErrorKind::SyntaxError.is_fatal());
        assert!(ErrorKind::ImportCycle.is_fatal());
        assert!(!ErrorKind::DuplicateDeclaration.is_fatal());
        assert!(!ErrorKind::ArgumentArityError.is_fatal());
    }
}

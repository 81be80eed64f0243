//! Dotted names for namespaces, imports and references.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Reasons a [`QualifiedName`] cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("qualified name must have at least one segment")]
    Empty,

    #[error("`{0}` is not a valid identifier")]
    InvalidSegment(String),
}

/// Returns `true` if `s` matches `[a-zA-Z_][a-zA-Z0-9_]*`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// An ordered, non-empty sequence of identifier segments.
///
/// Written `a.b.C` in source. The last segment is the simple name, the
/// segments before it (if any) name the namespace the simple name lives in.
///
/// # Example
///
/// ```
/// # use gmdsl_core::identifier::QualifiedName;
/// let name: QualifiedName = "gm.core.String".parse().unwrap();
/// assert_eq!(name.simple_name(), "String");
/// assert_eq!(name.namespace().unwrap().to_string(), "gm.core");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    segments: Vec<String>,
}

impl QualifiedName {
    /// Build a qualified name from its segments.
    ///
    /// # Errors
    ///
    /// Fails when `segments` is empty or any segment is not an identifier.
    pub fn new<I, S>(segments: I) -> Result<Self, NameError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(NameError::Empty);
        }
        if let Some(bad) = segments.iter().find(|segment| !is_identifier(segment)) {
            return Err(NameError::InvalidSegment(bad.clone()));
        }
        Ok(Self { segments })
    }

    /// A single-segment name.
    ///
    /// # Errors
    ///
    /// Fails when `name` is not an identifier.
    pub fn simple(name: impl Into<String>) -> Result<Self, NameError> {
        Self::new([name.into()])
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last segment.
    pub fn simple_name(&self) -> &str {
        // Non-empty by construction.
        self.segments.last().map_or("", String::as_str)
    }

    /// Everything but the last segment, or `None` for a bare name.
    pub fn namespace(&self) -> Option<QualifiedName> {
        if self.is_qualified() {
            Some(Self {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        } else {
            None
        }
    }

    /// Returns `true` if the name has more than one segment.
    pub fn is_qualified(&self) -> bool {
        self.segments.len() > 1
    }

    /// Append `name` as a new last segment.
    pub fn join(&self, name: &str) -> Result<QualifiedName, NameError> {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self::new(segments)
    }
}

impl FromStr for QualifiedName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NameError::Empty);
        }
        Self::new(s.split('.'))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_parse_and_display() {
        let name: QualifiedName = "gm.CoreTypes".parse().unwrap();
        assert_eq!(name.segments(), ["gm", "CoreTypes"]);
        assert_eq!(name.to_string(), "gm.CoreTypes");
        assert!(name.is_qualified());
    }

    #[test]
    fn test_bare_name_has_no_namespace() {
        let name = QualifiedName::simple("Person").unwrap();
        assert_eq!(name.simple_name(), "Person");
        assert!(name.namespace().is_none());
        assert!(!name.is_qualified());
    }

    #[test]
    fn test_rejects_empty_and_invalid() {
        assert_eq!("".parse::<QualifiedName>(), Err(NameError::Empty));
        assert_eq!(
            QualifiedName::new(Vec::<String>::new()),
            Err(NameError::Empty)
        );
        assert_eq!(
            "a..b".parse::<QualifiedName>(),
            Err(NameError::InvalidSegment(String::new()))
        );
        assert_eq!(
            "1abc".parse::<QualifiedName>(),
            Err(NameError::InvalidSegment("1abc".to_string()))
        );
    }

    #[test]
    fn test_join() {
        let ns: QualifiedName = "gm.core".parse().unwrap();
        assert_eq!(ns.join("String").unwrap().to_string(), "gm.core.String");
        assert!(ns.join("not valid").is_err());
    }

    proptest! {
        #[test]
        fn prop_display_parses_back(segments in prop::collection::vec("[a-zA-Z_][a-zA-Z0-9_]{0,8}", 1..5)) {
            let name = QualifiedName::new(segments).unwrap();
            let reparsed: QualifiedName = name.to_string().parse().unwrap();
            prop_assert_eq!(reparsed, name);
        }
    }
}

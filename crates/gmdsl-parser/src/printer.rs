//! Canonical source printer.
//!
//! [`print_document`] writes a [`Document`] back as gmdsl source: the
//! namespace first, then imports, then declarations in their original
//! order separated by blank lines, with bodies indented by four spaces and
//! one property per line. Parsing the output again yields a document equal
//! to the input (spans aside).
//!
//! Comments never reach the model, so printing drops them;
//! [`dropped_comments`] reports which ones.

use std::fmt::{self, Write as _};

use gmdsl_core::model::{AnnotationUsage, Declaration, Document, Literal, PropertyDecl};

use crate::{
    error::{Diagnostic, FrontendError, Severity},
    lexer,
};

const INDENT: &str = "    ";

/// Print `document` as canonical gmdsl source.
pub fn print_document(document: &Document) -> String {
    DocumentPrinter(document).to_string()
}

/// A diagnostic labelling every `//` comment of `source` that reprinting
/// it would lose, or `None` if it has none.
///
/// # Errors
///
/// Fails when `source` does not tokenize.
pub fn dropped_comments(
    source: &str,
    severity: Severity,
) -> Result<Option<Diagnostic>, FrontendError> {
    let comments = lexer::line_comments(source)?;
    let Some((first, rest)) = comments.split_first() else {
        return Ok(None);
    };

    let plural = if comments.len() == 1 { "" } else { "s" };
    let message = format!("formatting drops {} line comment{plural}", comments.len());
    let diagnostic = match severity {
        Severity::Error => Diagnostic::error(message),
        Severity::Warning => Diagnostic::warning(message),
    };

    let diagnostic = rest.iter().fold(
        diagnostic.with_label(*first, "comment not kept"),
        |diagnostic, span| diagnostic.with_secondary_label(*span, "also dropped"),
    );
    Ok(Some(diagnostic))
}

struct DocumentPrinter<'a>(&'a Document);

impl fmt::Display for DocumentPrinter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let document = self.0;
        let mut sections = 0;

        if let Some(namespace) = document.namespace() {
            writeln!(f, "namespace {namespace}")?;
            sections += 1;
        }

        if !document.imports().is_empty() {
            if sections > 0 {
                writeln!(f)?;
            }
            for import in document.imports() {
                writeln!(f, "import {import}")?;
            }
            sections += 1;
        }

        for declaration in document.declarations() {
            if sections > 0 {
                writeln!(f)?;
            }
            write_declaration(f, declaration)?;
            sections += 1;
        }

        Ok(())
    }
}

fn write_declaration(f: &mut fmt::Formatter<'_>, declaration: &Declaration) -> fmt::Result {
    for usage in declaration.annotations() {
        write_usage(f, usage)?;
        writeln!(f)?;
    }

    match declaration {
        Declaration::Type(decl) => {
            write!(f, "type {}", decl.name())?;
            if let Some(body) = decl.body() {
                write_body(f, body)?;
            }
        }
        Declaration::Node(decl) => {
            write!(f, "node {}", decl.name())?;
            write_body(f, decl.properties())?;
        }
        Declaration::Edge(decl) => {
            write!(
                f,
                "edge {}({} {} {})",
                decl.name(),
                decl.source(),
                decl.direction(),
                decl.target()
            )?;
            if let Some(body) = decl.body() {
                write_body(f, body)?;
            }
        }
        Declaration::Annotation(decl) => {
            write!(f, "annotation {}", decl.name())?;
            if !decl.parameters().is_empty() {
                f.write_char('(')?;
                for (i, param) in decl.parameters().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", param.name(), param.type_name())?;
                }
                f.write_char(')')?;
            }
        }
    }

    writeln!(f)
}

fn write_body(f: &mut fmt::Formatter<'_>, properties: &[PropertyDecl]) -> fmt::Result {
    if properties.is_empty() {
        return f.write_str(" {}");
    }

    f.write_str(" {\n")?;
    for property in properties {
        f.write_str(INDENT)?;
        for usage in property.annotations() {
            write_usage(f, usage)?;
            f.write_char(' ')?;
        }
        writeln!(f, "{}: {}", property.name(), property.type_ref())?;
    }
    f.write_char('}')
}

fn write_usage(f: &mut fmt::Formatter<'_>, usage: &AnnotationUsage) -> fmt::Result {
    write!(f, "@{}", usage.name())?;
    if usage.arguments().is_empty() {
        return Ok(());
    }

    f.write_char('(')?;
    for (i, argument) in usage.arguments().iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_literal(f, argument)?;
    }
    f.write_char(')')
}

fn write_literal(f: &mut fmt::Formatter<'_>, literal: &Literal) -> fmt::Result {
    match literal {
        Literal::String(value) => {
            f.write_char('"')?;
            for c in value.chars() {
                match c {
                    '"' => f.write_str("\\\"")?,
                    '\\' => f.write_str("\\\\")?,
                    '\n' => f.write_str("\\n")?,
                    '\r' => f.write_str("\\r")?,
                    '\t' => f.write_str("\\t")?,
                    c => f.write_char(c)?,
                }
            }
            f.write_char('"')
        }
        Literal::Number(number) => write!(f, "{number}"),
        Literal::Identifier(name) => write!(f, "{name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Span, parse};

    #[test]
    fn test_dropped_comments() {
        let source = "// owner: data team\ntype A // trailing\n";

        let diagnostic = dropped_comments(source, Severity::Warning).unwrap().unwrap();
        assert!(diagnostic.severity().is_warning());
        assert_eq!(diagnostic.message(), "formatting drops 2 line comments");
        assert_eq!(diagnostic.primary_label().unwrap().span(), Span::new(0..19));
        assert_eq!(diagnostic.labels().len(), 2);
        assert!(!print_document(&parse(source).unwrap()).contains("//"));

        let single = dropped_comments("type A // x", Severity::Error).unwrap().unwrap();
        assert!(single.severity().is_error());
        assert_eq!(single.message(), "formatting drops 1 line comment");

        assert!(dropped_comments("type A\n", Severity::Error).unwrap().is_none());
    }

    #[test]
    fn test_canonical_layout() {
        let source = r#"
            import gm.core   namespace gm.app
            annotation Label(text: String, weight: Float)
            @Label("Place", 2) node Place { @Indexed at: gm.geo.Point name: String }
            type Id
            edge Near(Place <-> Place)
            node Empty {
            }
        "#;
        let document = parse(source).unwrap();

        let expected = "\
namespace gm.app

import gm.core

annotation Label(text: String, weight: Float)

@Label(\"Place\", 2)
node Place {
    @Indexed at: gm.geo.Point
    name: String
}

type Id

edge Near(Place <-> Place)

node Empty {}
";
        assert_eq!(print_document(&document), expected);
    }

    #[test]
    fn test_string_escapes() {
        let document = parse(r#"@Doc("say \"hi\"\n\ttab \\ end") type T"#).unwrap();
        let printed = print_document(&document);

        assert_eq!(printed, "@Doc(\"say \\\"hi\\\"\\n\\ttab \\\\ end\")\ntype T\n");
        assert_eq!(parse(&printed).unwrap(), document);
    }

    #[test]
    fn test_empty_document() {
        let document = parse("// only a comment").unwrap();
        assert_eq!(print_document(&document), "");
    }
}

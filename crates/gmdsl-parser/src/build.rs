//! Model building phase.
//!
//! Lowers the borrowed parse tree from [`parser_types`] into the owned,
//! immutable [`gmdsl_core::model`] types. Declaration order is preserved
//! exactly; namespace and import declarations are lifted out of the
//! declaration list into the [`Document`] header.

use log::{debug, trace};

use gmdsl_core::{
    identifier::QualifiedName,
    model::{
        AnnotationDecl, AnnotationParameter, AnnotationUsage, Declaration, Document, EdgeDecl,
        Literal, NodeDecl, NumberLiteral, PropertyDecl, TypeDecl,
    },
    span::Spanned,
};

use crate::{
    error::{Diagnostic, ErrorCode},
    parser_types,
};

/// Builds a [`Document`] from one parse tree.
#[derive(Debug, Default)]
pub struct Builder {
    namespace: Option<Spanned<QualifiedName>>,
    imports: Vec<Spanned<QualifiedName>>,
    declarations: Vec<Declaration>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the parse tree and produce the model document.
    ///
    /// # Errors
    ///
    /// Returns an `E102` diagnostic if the tree declares more than one
    /// namespace.
    pub fn build(mut self, tree: parser_types::Document<'_>) -> Result<Document, Diagnostic> {
        debug!(declarations_len = tree.declarations.len(); "Building document");

        for declaration in tree.declarations {
            self.add_declaration(declaration)?;
        }

        trace!(namespace:? = self.namespace, imports:? = self.imports; "Document header");
        Ok(Document::new(self.namespace, self.imports, self.declarations))
    }

    fn add_declaration(&mut self, declaration: parser_types::Declaration<'_>) -> Result<(), Diagnostic> {
        match declaration {
            parser_types::Declaration::Namespace(name) => {
                if let Some(first) = &self.namespace {
                    return Err(Diagnostic::error(format!(
                        "namespace declared more than once (`{}` and `{}`)",
                        first.inner(),
                        name.inner()
                    ))
                    .with_code(ErrorCode::E102)
                    .with_label(name.span(), "second namespace declaration")
                    .with_secondary_label(first.span(), "first declared here")
                    .with_help("a document belongs to exactly one namespace"));
                }
                self.namespace = Some(name);
            }
            parser_types::Declaration::Import(name) => self.imports.push(name),
            parser_types::Declaration::Type { usages, name, body } => {
                self.declarations.push(Declaration::Type(TypeDecl::new(
                    owned_name(name),
                    build_usages(usages),
                    body.map(build_properties),
                )));
            }
            parser_types::Declaration::Node { usages, name, body } => {
                self.declarations.push(Declaration::Node(NodeDecl::new(
                    owned_name(name),
                    build_usages(usages),
                    build_properties(body),
                )));
            }
            parser_types::Declaration::Edge {
                usages,
                name,
                source,
                direction,
                target,
                body,
            } => {
                self.declarations.push(Declaration::Edge(EdgeDecl::new(
                    owned_name(name),
                    build_usages(usages),
                    source,
                    *direction.inner(),
                    target,
                    body.map(build_properties),
                )));
            }
            parser_types::Declaration::Annotation { name, parameters } => {
                let parameters = parameters
                    .into_iter()
                    .map(|param| AnnotationParameter::new(owned_name(param.name), param.type_name))
                    .collect();
                self.declarations
                    .push(Declaration::Annotation(AnnotationDecl::new(owned_name(name), parameters)));
            }
        }
        Ok(())
    }
}

fn owned_name(name: Spanned<&str>) -> Spanned<String> {
    name.map(|name| (*name).to_string())
}

fn build_properties(properties: Vec<parser_types::Property<'_>>) -> Vec<PropertyDecl> {
    properties
        .into_iter()
        .map(|property| {
            PropertyDecl::new(
                owned_name(property.name),
                property.type_ref,
                build_usages(property.usages),
            )
        })
        .collect()
}

fn build_usages(usages: Vec<parser_types::Usage<'_>>) -> Vec<AnnotationUsage> {
    usages
        .into_iter()
        .map(|usage| {
            let arguments = usage
                .arguments
                .into_iter()
                .map(|argument| {
                    argument.map(|argument| match argument {
                        parser_types::Argument::String(value) => Literal::String(value.clone()),
                        parser_types::Argument::Number(lexeme) => {
                            Literal::Number(NumberLiteral::new(*lexeme))
                        }
                        parser_types::Argument::Identifier(name) => Literal::Identifier(name.clone()),
                    })
                })
                .collect();
            AnnotationUsage::new(usage.name, arguments)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use gmdsl_core::model::{DeclarationKind, Direction};

    use super::*;
    use crate::{Span, lexer::tokenize, parser::build_document};

    fn build(source: &str) -> Result<Document, Diagnostic> {
        let tokens = tokenize(source).expect("Failed to tokenize input");
        let tree = build_document(&tokens).expect("Failed to parse input");
        Builder::new().build(tree)
    }

    #[test]
    fn test_header_is_lifted_out() {
        let doc = build("namespace gm.app\nimport gm.core\nimport gm.geo\nnode A {}").unwrap();

        assert_eq!(doc.namespace().unwrap().to_string(), "gm.app");
        assert_eq!(
            doc.imports().iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["gm.core", "gm.geo"]
        );
        assert_eq!(doc.declarations().len(), 1);
    }

    #[test]
    fn test_declaration_order_is_preserved() {
        let doc = build(
            "annotation Label(text: String)\n\
             type String\n\
             node B {}\n\
             edge E(B -> B)\n\
             node A {}",
        )
        .unwrap();

        let order: Vec<_> = doc
            .declarations()
            .iter()
            .map(|d| (d.kind(), d.name().to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                (DeclarationKind::Annotation, "Label".to_string()),
                (DeclarationKind::Type, "String".to_string()),
                (DeclarationKind::Node, "B".to_string()),
                (DeclarationKind::Edge, "E".to_string()),
                (DeclarationKind::Node, "A".to_string()),
            ]
        );
    }

    #[test]
    fn test_edge_and_literals() {
        let doc = build(r#"@Weight(1.5, "w\n", gm.Unit) edge Road(City <-> City)"#).unwrap();

        let Declaration::Edge(edge) = &doc.declarations()[0] else {
            panic!("expected edge");
        };
        assert_eq!(edge.direction(), Direction::Bidirectional);
        assert!(edge.body().is_none());

        let usage = &edge.annotations()[0];
        assert_eq!(
            usage.argument(0),
            Some(&Literal::Number(NumberLiteral::new("1.5")))
        );
        assert_eq!(usage.argument(1), Some(&Literal::String("w\n".to_string())));
        assert_eq!(
            usage.argument(2),
            Some(&Literal::Identifier("gm.Unit".parse().unwrap()))
        );
    }

    #[test]
    fn test_duplicate_namespace() {
        let err = build("namespace a\nnode X {}\nnamespace b").unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::E102));
        assert_eq!(err.primary_label().unwrap().span(), Span::new(32..33));
        assert_eq!(err.labels().len(), 2);
        assert!(err.labels()[1].is_secondary());
    }
}

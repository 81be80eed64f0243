//! The typed model of one parsed document.
//!
//! Every type here is immutable once built: fields are private and only
//! readable through accessors. Names and references keep the [`Span`] they
//! were parsed from for diagnostics; equality ignores those spans.

use std::fmt;

use crate::{
    identifier::QualifiedName,
    span::{Span, Spanned},
};

/// One parsed source unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    origin: Option<String>,
    namespace: Option<Spanned<QualifiedName>>,
    imports: Vec<Spanned<QualifiedName>>,
    declarations: Vec<Declaration>,
}

impl Document {
    pub fn new(
        namespace: Option<Spanned<QualifiedName>>,
        imports: Vec<Spanned<QualifiedName>>,
        declarations: Vec<Declaration>,
    ) -> Self {
        Self {
            origin: None,
            namespace,
            imports,
            declarations,
        }
    }

    /// Record where this document was loaded from (a path or a name).
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// The namespace this document declares, if any.
    pub fn namespace(&self) -> Option<&Spanned<QualifiedName>> {
        self.namespace.as_ref()
    }

    /// Imported namespaces, in source order.
    pub fn imports(&self) -> &[Spanned<QualifiedName>] {
        &self.imports
    }

    /// Declarations, in source order.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Declarations of one kind, in source order.
    pub fn declarations_of(&self, kind: DeclarationKind) -> impl Iterator<Item = &Declaration> {
        self.declarations
            .iter()
            .filter(move |declaration| declaration.kind() == kind)
    }

    /// Find the first declaration of `kind` named `name`.
    pub fn find(&self, kind: DeclarationKind, name: &str) -> Option<&Declaration> {
        self.declarations_of(kind)
            .find(|declaration| declaration.name().as_str() == name)
    }
}

/// The four kinds of named declarations.
///
/// Name uniqueness is checked per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclarationKind {
    Type,
    Node,
    Edge,
    Annotation,
}

impl DeclarationKind {
    /// The keyword introducing this kind of declaration.
    pub fn keyword(&self) -> &'static str {
        match self {
            DeclarationKind::Type => "type",
            DeclarationKind::Node => "node",
            DeclarationKind::Edge => "edge",
            DeclarationKind::Annotation => "annotation",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A named top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Type(TypeDecl),
    Node(NodeDecl),
    Edge(EdgeDecl),
    Annotation(AnnotationDecl),
}

impl Declaration {
    pub fn kind(&self) -> DeclarationKind {
        match self {
            Declaration::Type(_) => DeclarationKind::Type,
            Declaration::Node(_) => DeclarationKind::Node,
            Declaration::Edge(_) => DeclarationKind::Edge,
            Declaration::Annotation(_) => DeclarationKind::Annotation,
        }
    }

    pub fn name(&self) -> &Spanned<String> {
        match self {
            Declaration::Type(decl) => &decl.name,
            Declaration::Node(decl) => &decl.name,
            Declaration::Edge(decl) => &decl.name,
            Declaration::Annotation(decl) => &decl.name,
        }
    }

    /// Annotation usages attached to the declaration itself.
    ///
    /// Annotation declarations cannot be annotated and always return an
    /// empty slice.
    pub fn annotations(&self) -> &[AnnotationUsage] {
        match self {
            Declaration::Type(decl) => &decl.annotations,
            Declaration::Node(decl) => &decl.annotations,
            Declaration::Edge(decl) => &decl.annotations,
            Declaration::Annotation(_) => &[],
        }
    }

    /// Declared properties; empty when there is no body.
    pub fn properties(&self) -> &[PropertyDecl] {
        match self {
            Declaration::Type(decl) => decl.properties(),
            Declaration::Node(decl) => decl.properties(),
            Declaration::Edge(decl) => decl.properties(),
            Declaration::Annotation(_) => &[],
        }
    }
}

/// A reusable property type. Without a body it stands for a primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    name: Spanned<String>,
    annotations: Vec<AnnotationUsage>,
    body: Option<Vec<PropertyDecl>>,
}

impl TypeDecl {
    pub fn new(
        name: Spanned<String>,
        annotations: Vec<AnnotationUsage>,
        body: Option<Vec<PropertyDecl>>,
    ) -> Self {
        Self {
            name,
            annotations,
            body,
        }
    }

    pub fn name(&self) -> &Spanned<String> {
        &self.name
    }

    pub fn annotations(&self) -> &[AnnotationUsage] {
        &self.annotations
    }

    /// The body, or `None` for a bodiless declaration.
    pub fn body(&self) -> Option<&[PropertyDecl]> {
        self.body.as_deref()
    }

    pub fn properties(&self) -> &[PropertyDecl] {
        self.body.as_deref().unwrap_or_default()
    }

    /// A type with no declared properties is host-native for generators.
    pub fn is_primitive(&self) -> bool {
        self.properties().is_empty()
    }
}

/// A graph entity. The body is mandatory but may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDecl {
    name: Spanned<String>,
    annotations: Vec<AnnotationUsage>,
    properties: Vec<PropertyDecl>,
}

impl NodeDecl {
    pub fn new(
        name: Spanned<String>,
        annotations: Vec<AnnotationUsage>,
        properties: Vec<PropertyDecl>,
    ) -> Self {
        Self {
            name,
            annotations,
            properties,
        }
    }

    pub fn name(&self) -> &Spanned<String> {
        &self.name
    }

    pub fn annotations(&self) -> &[AnnotationUsage] {
        &self.annotations
    }

    pub fn properties(&self) -> &[PropertyDecl] {
        &self.properties
    }
}

/// Edge direction between the two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `->`
    OneWay,
    /// `<->`
    Bidirectional,
}

impl Direction {
    pub fn symbol(&self) -> &'static str {
        match self {
            Direction::OneWay => "->",
            Direction::Bidirectional => "<->",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A relationship between two node declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDecl {
    name: Spanned<String>,
    annotations: Vec<AnnotationUsage>,
    source: Spanned<QualifiedName>,
    direction: Direction,
    target: Spanned<QualifiedName>,
    body: Option<Vec<PropertyDecl>>,
}

impl EdgeDecl {
    pub fn new(
        name: Spanned<String>,
        annotations: Vec<AnnotationUsage>,
        source: Spanned<QualifiedName>,
        direction: Direction,
        target: Spanned<QualifiedName>,
        body: Option<Vec<PropertyDecl>>,
    ) -> Self {
        Self {
            name,
            annotations,
            source,
            direction,
            target,
            body,
        }
    }

    pub fn name(&self) -> &Spanned<String> {
        &self.name
    }

    pub fn annotations(&self) -> &[AnnotationUsage] {
        &self.annotations
    }

    pub fn source(&self) -> &Spanned<QualifiedName> {
        &self.source
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn target(&self) -> &Spanned<QualifiedName> {
        &self.target
    }

    pub fn body(&self) -> Option<&[PropertyDecl]> {
        self.body.as_deref()
    }

    pub fn properties(&self) -> &[PropertyDecl] {
        self.body.as_deref().unwrap_or_default()
    }
}

/// A named, typed member of a type, node or edge body.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    name: Spanned<String>,
    type_ref: Spanned<QualifiedName>,
    annotations: Vec<AnnotationUsage>,
}

impl PropertyDecl {
    pub fn new(
        name: Spanned<String>,
        type_ref: Spanned<QualifiedName>,
        annotations: Vec<AnnotationUsage>,
    ) -> Self {
        Self {
            name,
            type_ref,
            annotations,
        }
    }

    pub fn name(&self) -> &Spanned<String> {
        &self.name
    }

    /// The referenced type or node.
    pub fn type_ref(&self) -> &Spanned<QualifiedName> {
        &self.type_ref
    }

    pub fn annotations(&self) -> &[AnnotationUsage] {
        &self.annotations
    }

    /// From the property name to the end of its type reference.
    pub fn span(&self) -> Span {
        self.name.span().union(self.type_ref.span())
    }
}

/// A metadata declaration with optional typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationDecl {
    name: Spanned<String>,
    parameters: Vec<AnnotationParameter>,
}

impl AnnotationDecl {
    pub fn new(name: Spanned<String>, parameters: Vec<AnnotationParameter>) -> Self {
        Self { name, parameters }
    }

    pub fn name(&self) -> &Spanned<String> {
        &self.name
    }

    pub fn parameters(&self) -> &[AnnotationParameter] {
        &self.parameters
    }
}

/// One `name: Type` pair of an annotation declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationParameter {
    name: Spanned<String>,
    type_name: Spanned<QualifiedName>,
}

impl AnnotationParameter {
    pub fn new(name: Spanned<String>, type_name: Spanned<QualifiedName>) -> Self {
        Self { name, type_name }
    }

    pub fn name(&self) -> &Spanned<String> {
        &self.name
    }

    pub fn type_name(&self) -> &Spanned<QualifiedName> {
        &self.type_name
    }
}

/// An `@Name(args...)` attached to a declaration or property.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationUsage {
    name: Spanned<QualifiedName>,
    arguments: Vec<Spanned<Literal>>,
}

impl AnnotationUsage {
    pub fn new(name: Spanned<QualifiedName>, arguments: Vec<Spanned<Literal>>) -> Self {
        Self { name, arguments }
    }

    pub fn name(&self) -> &Spanned<QualifiedName> {
        &self.name
    }

    pub fn arguments(&self) -> &[Spanned<Literal>] {
        &self.arguments
    }

    /// The argument at `index`, if supplied.
    pub fn argument(&self, index: usize) -> Option<&Literal> {
        self.arguments.get(index).map(Spanned::inner)
    }

    /// From the annotation name to the last argument.
    pub fn span(&self) -> Span {
        self.arguments
            .iter()
            .fold(self.name.span(), |span, arg| span.union(arg.span()))
    }
}

/// Find a usage by simple name among `annotations`.
pub fn find_annotation<'a>(
    annotations: &'a [AnnotationUsage],
    name: &str,
) -> Option<&'a AnnotationUsage> {
    annotations
        .iter()
        .find(|usage| usage.name().simple_name() == name)
}

/// An annotation argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(NumberLiteral),
    Identifier(QualifiedName),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(value) => write!(f, "{value:?}"),
            Literal::Number(number) => write!(f, "{number}"),
            Literal::Identifier(name) => write!(f, "{name}"),
        }
    }
}

/// A decimal number kept as written, e.g. `42` or `3.25`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NumberLiteral(String);

impl NumberLiteral {
    /// Wrap a lexeme of the form `[0-9]+(\.[0-9]+)?`.
    pub fn new(lexeme: impl Into<String>) -> Self {
        Self(lexeme.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the number has no fractional part.
    pub fn is_integer(&self) -> bool {
        !self.0.contains('.')
    }

    /// The value as an integer, if it is one and fits.
    pub fn as_i64(&self) -> Option<i64> {
        if self.is_integer() {
            self.0.parse().ok()
        } else {
            None
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for NumberLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(value: &str, at: usize) -> Spanned<String> {
        Spanned::new(value.to_string(), Span::new(at..at + value.len()))
    }

    fn reference(value: &str, at: usize) -> Spanned<QualifiedName> {
        Spanned::new(value.parse().unwrap(), Span::new(at..at + value.len()))
    }

    #[test]
    fn test_type_without_body_is_primitive() {
        let string = TypeDecl::new(name("String", 5), vec![], None);
        assert!(string.is_primitive());
        assert!(string.body().is_none());
        assert!(string.properties().is_empty());

        let point = TypeDecl::new(
            name("Point", 5),
            vec![],
            Some(vec![PropertyDecl::new(
                name("x", 14),
                reference("Float", 17),
                vec![],
            )]),
        );
        assert!(!point.is_primitive());
        assert_eq!(point.properties().len(), 1);
    }

    #[test]
    fn test_declaration_accessors() {
        let edge = Declaration::Edge(EdgeDecl::new(
            name("Knows", 5),
            vec![AnnotationUsage::new(reference("Since", 0), vec![])],
            reference("Person", 11),
            Direction::Bidirectional,
            reference("Person", 22),
            None,
        ));
        assert_eq!(edge.kind(), DeclarationKind::Edge);
        assert_eq!(edge.name().as_str(), "Knows");
        assert_eq!(edge.annotations().len(), 1);
        assert!(edge.properties().is_empty());
    }

    #[test]
    fn test_document_find_is_kind_scoped() {
        let document = Document::new(
            None,
            vec![],
            vec![
                Declaration::Type(TypeDecl::new(name("Address", 5), vec![], None)),
                Declaration::Node(NodeDecl::new(name("Address", 25), vec![], vec![])),
            ],
        );
        assert!(matches!(
            document.find(DeclarationKind::Node, "Address"),
            Some(Declaration::Node(_))
        ));
        assert!(document.find(DeclarationKind::Edge, "Address").is_none());
        assert_eq!(document.declarations_of(DeclarationKind::Type).count(), 1);
    }

    #[test]
    fn test_equality_ignores_spans() {
        let a = PropertyDecl::new(name("at", 0), reference("Point", 4), vec![]);
        let b = PropertyDecl::new(name("at", 100), reference("Point", 120), vec![]);
        assert_eq!(a, b);
        assert_eq!(a.span(), Span::new(0..9));
    }

    #[test]
    fn test_number_literal() {
        assert_eq!(NumberLiteral::new("42").as_i64(), Some(42));
        assert_eq!(NumberLiteral::new("3.25").as_i64(), None);
        assert_eq!(NumberLiteral::new("3.25").as_f64(), Some(3.25));
        assert!(!NumberLiteral::new("1.0").is_integer());
    }

    #[test]
    fn test_find_annotation_and_arguments() {
        let usages = vec![
            AnnotationUsage::new(
                reference("Label", 0),
                vec![Spanned::new(
                    Literal::String("Person".to_string()),
                    Span::new(7..15),
                )],
            ),
            AnnotationUsage::new(reference("gm.Indexed", 20), vec![]),
        ];
        let label = find_annotation(&usages, "Label").unwrap();
        assert_eq!(label.argument(0), Some(&Literal::String("Person".to_string())));
        assert_eq!(label.argument(1), None);
        assert_eq!(label.span(), Span::new(0..15));
        assert!(find_annotation(&usages, "Indexed").is_some());
        assert!(find_annotation(&usages, "Missing").is_none());
    }
}

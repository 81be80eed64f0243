//! Parse tree produced by the [`parser`](super::parser).
//!
//! The tree mirrors the grammar one production per type and borrows names
//! from the source text. The [`build`](super::build) module turns it into
//! the owned [`gmdsl_core::model`] types.

use gmdsl_core::{identifier::QualifiedName, model::Direction, span::Spanned};

/// A whole source unit: declarations in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Document<'src> {
    pub declarations: Vec<Declaration<'src>>,
}

/// One top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration<'src> {
    /// `namespace a.b`
    Namespace(Spanned<QualifiedName>),
    /// `import a.b`
    Import(Spanned<QualifiedName>),
    /// `@A type Name { ... }`, body optional
    Type {
        usages: Vec<Usage<'src>>,
        name: Spanned<&'src str>,
        body: Option<Vec<Property<'src>>>,
    },
    /// `@A node Name { ... }`, body mandatory
    Node {
        usages: Vec<Usage<'src>>,
        name: Spanned<&'src str>,
        body: Vec<Property<'src>>,
    },
    /// `@A edge Name(Source -> Target) { ... }`, body optional
    Edge {
        usages: Vec<Usage<'src>>,
        name: Spanned<&'src str>,
        source: Spanned<QualifiedName>,
        direction: Spanned<Direction>,
        target: Spanned<QualifiedName>,
        body: Option<Vec<Property<'src>>>,
    },
    /// `annotation Name(param: Type, ...)`, parameter list optional
    Annotation {
        name: Spanned<&'src str>,
        parameters: Vec<Parameter<'src>>,
    },
}

/// `@A name: Type`
#[derive(Debug, Clone, PartialEq)]
pub struct Property<'src> {
    pub usages: Vec<Usage<'src>>,
    pub name: Spanned<&'src str>,
    pub type_ref: Spanned<QualifiedName>,
}

/// `name: Type` inside an annotation declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter<'src> {
    pub name: Spanned<&'src str>,
    pub type_name: Spanned<QualifiedName>,
}

/// `@Name` or `@Name(arg, ...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Usage<'src> {
    pub name: Spanned<QualifiedName>,
    pub arguments: Vec<Spanned<Argument<'src>>>,
}

/// A literal or identifier passed to an annotation usage.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument<'src> {
    String(String),
    Number(&'src str),
    Identifier(QualifiedName),
}

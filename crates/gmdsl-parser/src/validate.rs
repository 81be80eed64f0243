//! Semantic validation of a resolved model.
//!
//! The validator walks every declaration in a [`ResolvedModel`] and checks
//! that same-kind names are unique across the whole resolution scope and
//! that every reference (property types, annotation parameter types, edge
//! endpoints, annotation usages) points at a declaration of an acceptable
//! kind. It is fail-slow: all problems are collected and returned together.
//!
//! A successful validation yields a [`ValidatedModel`], the only input the
//! generators accept.

use std::collections::HashMap;

use log::{debug, info};

use gmdsl_core::{
    identifier::QualifiedName,
    model::{AnnotationDecl, AnnotationUsage, Declaration, DeclarationKind, Literal, PropertyDecl},
    span::{Span, Spanned},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, FrontendError},
    resolve::{NamespaceEntry, NamespaceId, ResolvedModel},
};

/// Adjustable validation rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Accept annotation usages that supply fewer arguments than the
    /// annotation declares parameters. Trailing parameters are then
    /// simply absent. Supplying more is always an error.
    pub allow_partial_annotation_arguments: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            allow_partial_annotation_arguments: true,
        }
    }
}

/// Address of one declaration inside a [`ResolvedModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclarationRef {
    namespace: NamespaceId,
    index: usize,
}

impl DeclarationRef {
    /// The namespace whose document holds the declaration.
    pub fn namespace(self) -> NamespaceId {
        self.namespace
    }

    /// Position in that document's declaration list.
    pub fn index(self) -> usize {
        self.index
    }
}

/// Declarations of a resolution scope indexed by kind and simple name.
///
/// A bare reference `Name` matches any declaration of that name; a
/// qualified reference `a.b.Name` only matches one declared in a document
/// whose namespace is `a.b`. When several declarations match (which the
/// validator reports as duplicates), the first in table order wins.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    by_name: HashMap<DeclarationKind, HashMap<String, Vec<DeclarationRef>>>,
    namespace_names: Vec<Option<QualifiedName>>,
}

impl SymbolTable {
    pub fn build(model: &ResolvedModel) -> Self {
        let mut table = Self {
            namespace_names: model
                .namespaces()
                .map(|(_, entry)| entry.name().cloned())
                .collect(),
            ..Self::default()
        };

        for (namespace, entry) in model.namespaces() {
            for (index, declaration) in entry.document().declarations().iter().enumerate() {
                table
                    .by_name
                    .entry(declaration.kind())
                    .or_default()
                    .entry(declaration.name().inner().clone())
                    .or_default()
                    .push(DeclarationRef { namespace, index });
            }
        }

        table
    }

    /// Every declaration of `kind` with simple name `name`, in table order.
    pub fn candidates(&self, kind: DeclarationKind, name: &str) -> &[DeclarationRef] {
        self.by_name
            .get(&kind)
            .and_then(|names| names.get(name))
            .map_or(&[], Vec::as_slice)
    }

    /// Resolve a reference to a declaration of `kind`.
    pub fn lookup(&self, kind: DeclarationKind, name: &QualifiedName) -> Option<DeclarationRef> {
        let namespace = name.namespace();
        self.candidates(kind, name.simple_name())
            .iter()
            .copied()
            .find(|candidate| match &namespace {
                None => true,
                Some(namespace) => {
                    self.namespace_names
                        .get(candidate.namespace.index())
                        .and_then(Option::as_ref)
                        == Some(namespace)
                }
            })
    }

    /// Resolve a reference that may name either a `type` or a `node`.
    pub fn lookup_type_or_node(&self, name: &QualifiedName) -> Option<DeclarationRef> {
        self.lookup(DeclarationKind::Type, name)
            .or_else(|| self.lookup(DeclarationKind::Node, name))
    }
}

/// A resolved model that passed validation.
///
/// Only obtainable through [`ValidatedModel::new`], so holding one proves
/// every reference in it resolves.
#[derive(Debug, Clone)]
pub struct ValidatedModel {
    model: ResolvedModel,
    symbols: SymbolTable,
}

impl ValidatedModel {
    /// Validate `model` and wrap it on success.
    ///
    /// # Errors
    ///
    /// Returns every error-severity diagnostic found.
    pub fn new(model: ResolvedModel, policy: &ValidationPolicy) -> Result<Self, FrontendError> {
        let symbols = SymbolTable::build(&model);

        let mut collector = DiagnosticCollector::new();
        Validator::new(&model, &symbols, policy, &mut collector).run();
        collector.finish()?;

        Ok(Self { model, symbols })
    }

    pub fn model(&self) -> &ResolvedModel {
        &self.model
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// `None` when `reference` does not address a declaration of this model.
    pub fn declaration(&self, reference: DeclarationRef) -> Option<&Declaration> {
        self.model
            .document(reference.namespace)?
            .declarations()
            .get(reference.index)
    }

    /// All declarations with their addresses.
    pub fn declarations(&self) -> impl Iterator<Item = (DeclarationRef, &Declaration)> {
        self.model.namespaces().flat_map(|(namespace, entry)| {
            entry
                .document()
                .declarations()
                .iter()
                .enumerate()
                .map(move |(index, declaration)| (DeclarationRef { namespace, index }, declaration))
        })
    }

    /// The namespace-qualified name of a declaration, e.g. `gm.geo.Point`.
    pub fn qualified_name(&self, reference: DeclarationRef) -> Option<String> {
        let name = self.declaration(reference)?.name();
        let qualified = match self.model.namespace(reference.namespace)?.name() {
            Some(namespace) => format!("{namespace}.{name}"),
            None => name.to_string(),
        };
        Some(qualified)
    }

    /// The `type` or `node` a property or parameter type refers to.
    pub fn resolve_type(&self, name: &QualifiedName) -> Option<&Declaration> {
        self.symbols
            .lookup_type_or_node(name)
            .and_then(|reference| self.declaration(reference))
    }

    /// The `node` an edge endpoint refers to.
    pub fn resolve_node(&self, name: &QualifiedName) -> Option<&Declaration> {
        self.symbols
            .lookup(DeclarationKind::Node, name)
            .and_then(|reference| self.declaration(reference))
    }

    /// The annotation declaration a usage refers to.
    pub fn resolve_annotation(&self, usage: &AnnotationUsage) -> Option<&AnnotationDecl> {
        self.symbols
            .lookup(DeclarationKind::Annotation, usage.name())
            .and_then(|reference| match self.declaration(reference)? {
                Declaration::Annotation(decl) => Some(decl),
                _ => None,
            })
    }

    /// The argument a usage supplies for the parameter named `parameter`.
    ///
    /// `None` when the annotation has no such parameter or the usage leaves
    /// it out (partial argument lists are matched positionally).
    pub fn annotation_argument<'a>(
        &self,
        usage: &'a AnnotationUsage,
        parameter: &str,
    ) -> Option<&'a Literal> {
        let position = self
            .resolve_annotation(usage)?
            .parameters()
            .iter()
            .position(|param| param.name().inner() == parameter)?;
        usage.argument(position)
    }
}

/// Check `model` and return every diagnostic found, without wrapping it.
pub fn validate(model: &ResolvedModel, policy: &ValidationPolicy) -> Vec<Diagnostic> {
    let symbols = SymbolTable::build(model);
    let mut collector = DiagnosticCollector::new();
    Validator::new(model, &symbols, policy, &mut collector).run();
    collector.into_diagnostics()
}

struct Validator<'a> {
    model: &'a ResolvedModel,
    symbols: &'a SymbolTable,
    policy: &'a ValidationPolicy,
    collector: &'a mut DiagnosticCollector,
    /// Origin of the document being checked.
    origin: Option<&'a str>,
}

impl<'a> Validator<'a> {
    fn new(
        model: &'a ResolvedModel,
        symbols: &'a SymbolTable,
        policy: &'a ValidationPolicy,
        collector: &'a mut DiagnosticCollector,
    ) -> Self {
        Self {
            model,
            symbols,
            policy,
            collector,
            origin: None,
        }
    }

    fn run(mut self) {
        info!(namespaces_len = self.model.namespaces().count(); "Validating model");

        self.check_uniqueness();

        for (_, entry) in self.model.namespaces() {
            self.origin = entry.document().origin();
            for declaration in entry.document().declarations() {
                self.check_declaration(declaration);
            }
        }

        info!(has_errors = self.collector.has_errors(); "Validation completed");
    }

    fn emit(&mut self, diagnostic: Diagnostic) {
        debug!(diagnostic = diagnostic.to_string(); "Validation problem");
        self.collector.emit(diagnostic.with_origin(self.origin));
    }

    fn check_uniqueness(&mut self) {
        let mut seen: HashMap<(DeclarationKind, &str), (NamespaceId, Span)> = HashMap::new();

        for (namespace, entry) in self.model.namespaces() {
            self.origin = entry.document().origin();
            for declaration in entry.document().declarations() {
                let name = declaration.name();
                let key = (declaration.kind(), name.as_str());
                let Some(&(first_namespace, first_span)) = seen.get(&key) else {
                    seen.insert(key, (namespace, name.span()));
                    continue;
                };

                let mut diagnostic = Diagnostic::error(format!(
                    "{} `{}` is declared more than once",
                    declaration.kind(),
                    name
                ))
                .with_code(ErrorCode::E300)
                .with_label(name.span(), "duplicate declaration");

                diagnostic = if first_namespace == namespace {
                    diagnostic.with_secondary_label(first_span, "first declared here")
                } else {
                    let other = self
                        .model
                        .namespace(first_namespace)
                        .and_then(NamespaceEntry::name)
                        .map_or_else(|| "the root document".to_string(), |ns| format!("namespace `{ns}`"));
                    diagnostic.with_help(format!(
                        "first declared in {other}; imported names share one scope"
                    ))
                };
                self.emit(diagnostic);
            }
        }
    }

    fn check_declaration(&mut self, declaration: &Declaration) {
        self.check_usages(declaration.annotations());
        for property in declaration.properties() {
            self.check_property(property);
        }

        match declaration {
            Declaration::Edge(edge) => {
                self.check_endpoint(edge.source());
                self.check_endpoint(edge.target());
            }
            Declaration::Annotation(annotation) => {
                for parameter in annotation.parameters() {
                    if self.symbols.lookup_type_or_node(parameter.type_name()).is_none() {
                        self.emit(
                            Diagnostic::error(format!(
                                "unresolved type `{}` for parameter `{}` of annotation `{}`",
                                parameter.type_name(),
                                parameter.name(),
                                annotation.name()
                            ))
                            .with_code(ErrorCode::E301)
                            .with_label(parameter.type_name().span(), "not a declared type or node"),
                        );
                    }
                }
            }
            Declaration::Type(_) | Declaration::Node(_) => {}
        }
    }

    fn check_property(&mut self, property: &PropertyDecl) {
        self.check_usages(property.annotations());

        // Self references are fine; only existence is checked.
        if self.symbols.lookup_type_or_node(property.type_ref()).is_none() {
            self.emit(
                Diagnostic::error(format!(
                    "unresolved type `{}` for property `{}`",
                    property.type_ref(),
                    property.name()
                ))
                .with_code(ErrorCode::E301)
                .with_label(property.span(), "not a declared type or node"),
            );
        }
    }

    fn check_endpoint(&mut self, endpoint: &Spanned<QualifiedName>) {
        if self.symbols.lookup(DeclarationKind::Node, endpoint).is_some() {
            return;
        }

        let mut diagnostic =
            Diagnostic::error(format!("edge endpoint `{endpoint}` is not a declared node"))
                .with_code(ErrorCode::E301)
                .with_label(endpoint.span(), "unresolved edge endpoint");
        if self.symbols.lookup(DeclarationKind::Type, endpoint).is_some() {
            diagnostic = diagnostic.with_help(format!(
                "`{endpoint}` is declared as a type; edges may only connect nodes"
            ));
        }
        self.emit(diagnostic);
    }

    fn check_usages(&mut self, usages: &[AnnotationUsage]) {
        for usage in usages {
            let Some(reference) = self.symbols.lookup(DeclarationKind::Annotation, usage.name()) else {
                self.emit(
                    Diagnostic::error(format!("unknown annotation `{}`", usage.name()))
                        .with_code(ErrorCode::E301)
                        .with_label(usage.name().span(), "not a declared annotation"),
                );
                continue;
            };

            let declared = self
                .model
                .document(reference.namespace)
                .and_then(|document| document.declarations().get(reference.index))
                .map_or(0, |declaration| match declaration {
                    Declaration::Annotation(decl) => decl.parameters().len(),
                    _ => 0,
                });
            let supplied = usage.arguments().len();

            let too_many = supplied > declared;
            let too_few = supplied < declared && !self.policy.allow_partial_annotation_arguments;
            if too_many || too_few {
                self.emit(
                    Diagnostic::error(format!(
                        "annotation `{}` takes {declared} argument{} but {supplied} {} supplied",
                        usage.name(),
                        if declared == 1 { "" } else { "s" },
                        if supplied == 1 { "was" } else { "were" },
                    ))
                    .with_code(ErrorCode::E302)
                    .with_label(usage.span(), "wrong number of arguments"),
                );
            }
        }
    }
}

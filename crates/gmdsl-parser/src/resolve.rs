//! Namespace and import resolution.
//!
//! [`resolve`] walks the import graph of a root document depth-first,
//! loading every transitively imported namespace through a
//! [`NamespaceLoader`] supplied by the embedding tool. The result is a
//! [`ResolvedModel`]: an index-addressed namespace table holding one
//! document per namespace, plus the import graph used to build it.
//!
//! Resolution is a pure merge. It never drops or renames a declaration;
//! conflicting names are left for the validator to report. Missing
//! namespaces and import cycles are fatal and stop resolution at once.

use std::collections::HashMap;

use indexmap::IndexSet;
use log::{debug, info, trace};
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

use gmdsl_core::{
    identifier::QualifiedName,
    model::{Declaration, Document},
    span::Spanned,
};

use crate::{
    Span,
    error::{Diagnostic, ErrorCode, FrontendError},
    parse_with_origin,
};

/// Why a namespace could not be loaded.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// Nothing provides the namespace. `searched` lists where the loader
    /// looked, for the diagnostic's help text.
    #[error("namespace not found")]
    NotFound { searched: Vec<String> },

    /// The namespace was found but its source failed to lex or parse.
    #[error("namespace source is invalid: {0}")]
    Invalid(#[from] FrontendError),
}

/// Source of imported namespaces.
///
/// Implemented by the embedding tool, typically on top of a filesystem
/// search path. Any `FnMut(&QualifiedName) -> Result<Document, LoadError>`
/// closure is a loader too.
pub trait NamespaceLoader {
    /// Load the document providing namespace `name`.
    fn load(&mut self, name: &QualifiedName) -> Result<Document, LoadError>;
}

impl<F> NamespaceLoader for F
where
    F: FnMut(&QualifiedName) -> Result<Document, LoadError>,
{
    fn load(&mut self, name: &QualifiedName) -> Result<Document, LoadError> {
        self(name)
    }
}

/// Loader serving namespaces from in-memory source text.
///
/// Documents are parsed on load with the namespace name as their origin.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    sources: HashMap<QualifiedName, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `source` as the text of namespace `name`.
    pub fn insert(&mut self, name: QualifiedName, source: impl Into<String>) -> &mut Self {
        self.sources.insert(name, source.into());
        self
    }

    /// The source text registered for `name`.
    pub fn source(&self, name: &QualifiedName) -> Option<&str> {
        self.sources.get(name).map(String::as_str)
    }
}

impl NamespaceLoader for MemoryLoader {
    fn load(&mut self, name: &QualifiedName) -> Result<Document, LoadError> {
        let source = self.sources.get(name).ok_or_else(|| LoadError::NotFound {
            searched: vec!["in-memory sources".to_string()],
        })?;
        Ok(parse_with_origin(source, &name.to_string())?)
    }
}

/// Index of a namespace in a [`ResolvedModel`]'s table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(usize);

impl NamespaceId {
    /// Position in the namespace table; the root is always `0`.
    pub fn index(self) -> usize {
        self.0
    }
}

/// One loaded namespace.
#[derive(Debug, Clone)]
pub struct NamespaceEntry {
    name: Option<QualifiedName>,
    document: Document,
}

impl NamespaceEntry {
    /// The namespace name. `None` only for a root document without a
    /// `namespace` declaration.
    pub fn name(&self) -> Option<&QualifiedName> {
        self.name.as_ref()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

/// A root document merged with every namespace it transitively imports.
///
/// Immutable once built. The namespace table is in discovery order: the
/// root first, then imports depth-first in declaration order.
#[derive(Debug, Clone)]
pub struct ResolvedModel {
    namespaces: Vec<NamespaceEntry>,
    /// Edges run importer -> imported, weighted by the import's span.
    import_graph: DiGraph<NamespaceId, Span>,
}

impl ResolvedModel {
    /// The id of the document resolution started from.
    pub fn root(&self) -> NamespaceId {
        NamespaceId(0)
    }

    /// `None` when `id` was issued by another model.
    pub fn namespace(&self, id: NamespaceId) -> Option<&NamespaceEntry> {
        self.namespaces.get(id.0)
    }

    pub fn document(&self, id: NamespaceId) -> Option<&Document> {
        self.namespace(id).map(NamespaceEntry::document)
    }

    /// All namespaces in table order.
    pub fn namespaces(&self) -> impl Iterator<Item = (NamespaceId, &NamespaceEntry)> {
        self.namespaces
            .iter()
            .enumerate()
            .map(|(index, entry)| (NamespaceId(index), entry))
    }

    /// Look a namespace up by name.
    pub fn find_namespace(&self, name: &QualifiedName) -> Option<NamespaceId> {
        self.namespaces()
            .find(|(_, entry)| entry.name() == Some(name))
            .map(|(id, _)| id)
    }

    /// Every declaration in the resolution scope with the namespace that
    /// declares it, in table order and then source order.
    pub fn declarations(&self) -> impl Iterator<Item = (NamespaceId, &Declaration)> {
        self.namespaces().flat_map(|(id, entry)| {
            entry
                .document
                .declarations()
                .iter()
                .map(move |declaration| (id, declaration))
        })
    }

    /// Namespaces imported directly by `id`, in table order.
    pub fn imports_of(&self, id: NamespaceId) -> Vec<NamespaceId> {
        let mut imports: Vec<NamespaceId> = self
            .import_graph
            .neighbors(NodeIndex::new(id.0))
            .map(|node| self.import_graph[node])
            .collect();
        imports.sort();
        imports.dedup();
        imports
    }

    /// The import dependency graph.
    pub fn import_graph(&self) -> &DiGraph<NamespaceId, Span> {
        &self.import_graph
    }
}

struct Resolver<'l, L: NamespaceLoader + ?Sized> {
    loader: &'l mut L,
    namespaces: Vec<NamespaceEntry>,
    index: HashMap<QualifiedName, NamespaceId>,
    import_graph: DiGraph<NamespaceId, Span>,
    /// Namespaces on the current depth-first path.
    resolving: IndexSet<NamespaceId>,
}

impl<'l, L: NamespaceLoader + ?Sized> Resolver<'l, L> {
    fn new(loader: &'l mut L) -> Self {
        Self {
            loader,
            namespaces: Vec::new(),
            index: HashMap::new(),
            import_graph: DiGraph::new(),
            resolving: IndexSet::new(),
        }
    }

    fn register(&mut self, name: Option<QualifiedName>, document: Document) -> NamespaceId {
        let id = NamespaceId(self.namespaces.len());
        let node = self.import_graph.add_node(id);
        debug_assert_eq!(node.index(), id.0);

        if let Some(name) = &name {
            self.index.insert(name.clone(), id);
        }
        self.namespaces.push(NamespaceEntry { name, document });
        id
    }

    fn display_name(&self, id: NamespaceId) -> String {
        self.namespaces[id.0]
            .name
            .as_ref()
            .map_or_else(|| "<root>".to_string(), ToString::to_string)
    }

    fn visit(&mut self, id: NamespaceId) -> Result<(), FrontendError> {
        self.resolving.insert(id);

        let imports = self.namespaces[id.0].document.imports().to_vec();
        for import in &imports {
            let target = match self.index.get(import.inner()).copied() {
                Some(target) if self.resolving.contains(&target) => {
                    return Err(self.cycle_error(id, target, import).into());
                }
                Some(target) => {
                    trace!(namespace = import.to_string(); "Namespace already loaded");
                    target
                }
                None => {
                    let target = self.load(id, import)?;
                    self.add_import_edge(id, target, import.span());
                    self.visit(target)?;
                    continue;
                }
            };
            self.add_import_edge(id, target, import.span());
        }

        self.resolving.shift_remove(&id);
        Ok(())
    }

    fn add_import_edge(&mut self, from: NamespaceId, to: NamespaceId, span: Span) {
        self.import_graph
            .add_edge(NodeIndex::new(from.0), NodeIndex::new(to.0), span);
    }

    fn load(
        &mut self,
        importer: NamespaceId,
        import: &Spanned<QualifiedName>,
    ) -> Result<NamespaceId, FrontendError> {
        let origin = self.namespaces[importer.0]
            .document
            .origin()
            .map(str::to_owned);

        match self.loader.load(import.inner()) {
            Ok(document) => {
                debug!(
                    namespace = import.to_string(),
                    declarations_len = document.declarations().len();
                    "Loaded namespace",
                );
                Ok(self.register(Some(import.inner().clone()), document))
            }
            Err(LoadError::NotFound { searched }) => {
                let mut diagnostic =
                    Diagnostic::error(format!("namespace `{}` not found", import.inner()))
                        .with_code(ErrorCode::E200)
                        .with_label(import.span(), "imported here")
                        .with_origin(origin.as_deref());
                if !searched.is_empty() {
                    diagnostic = diagnostic.with_help(format!("searched: {}", searched.join(", ")));
                }
                Err(diagnostic.into())
            }
            Err(LoadError::Invalid(err)) => Err(err.with_origin(Some(&import.to_string()))),
        }
    }

    fn cycle_error(
        &self,
        importer: NamespaceId,
        target: NamespaceId,
        import: &Spanned<QualifiedName>,
    ) -> Diagnostic {
        let start = self.resolving.get_index_of(&target).unwrap_or(0);
        let path: Vec<String> = self
            .resolving
            .iter()
            .skip(start)
            .chain(std::iter::once(&target))
            .map(|id| self.display_name(*id))
            .collect();

        Diagnostic::error(format!("import cycle detected: {}", path.join(" -> ")))
            .with_code(ErrorCode::E201)
            .with_label(import.span(), "this import closes the cycle")
            .with_help("namespaces may not import themselves, directly or indirectly")
            .with_origin(self.namespaces[importer.0].document.origin())
    }

    fn finish(self) -> ResolvedModel {
        ResolvedModel {
            namespaces: self.namespaces,
            import_graph: self.import_graph,
        }
    }
}

/// Resolve `document` and everything it transitively imports.
///
/// Each namespace is loaded at most once, however many documents import
/// it. The root's own namespace (if declared) takes part in cycle
/// detection, so a document importing itself is a cycle.
///
/// # Errors
///
/// Fails on the first missing namespace (`E200`), import cycle (`E201`),
/// or imported document that does not parse.
pub fn resolve<L: NamespaceLoader + ?Sized>(
    document: Document,
    loader: &mut L,
) -> Result<ResolvedModel, FrontendError> {
    let root_name = document.namespace().map(|name| name.inner().clone());
    info!(namespace:? = root_name.as_ref().map(ToString::to_string); "Resolving imports");

    let mut resolver = Resolver::new(loader);
    let root = resolver.register(root_name, document);
    resolver.visit(root)?;

    let model = resolver.finish();
    info!(namespaces_len = model.namespaces.len(); "Import resolution completed");
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, parse};

    fn name(s: &str) -> QualifiedName {
        s.parse().unwrap()
    }

    fn loader(entries: &[(&str, &str)]) -> MemoryLoader {
        let mut loader = MemoryLoader::new();
        for (ns, source) in entries {
            loader.insert(name(ns), *source);
        }
        loader
    }

    #[test]
    fn test_no_imports() {
        let doc = parse("type Point { x: Float }\nnode Place { at: Point }").unwrap();
        let model = resolve(doc.clone(), &mut MemoryLoader::new()).unwrap();

        assert_eq!(model.namespaces().count(), 1);
        let declarations: Vec<_> = model.declarations().map(|(_, d)| d.clone()).collect();
        assert_eq!(declarations, doc.declarations());
        assert_eq!(model.import_graph().edge_count(), 0);
        assert_eq!(model.document(model.root()), Some(&doc));
    }

    #[test]
    fn test_transitive_imports() {
        let mut loader = loader(&[
            ("gm.geo", "namespace gm.geo\nimport gm.core\ntype Point { x: Float }"),
            ("gm.core", "namespace gm.core\ntype Float"),
        ]);
        let doc = parse("namespace app\nimport gm.geo\nnode Place { at: Point }").unwrap();
        let model = resolve(doc, &mut loader).unwrap();

        let names: Vec<_> = model
            .namespaces()
            .map(|(_, entry)| entry.name().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["app", "gm.geo", "gm.core"]);
        assert_eq!(model.declarations().count(), 3);

        let geo = model.find_namespace(&name("gm.geo")).unwrap();
        let core = model.find_namespace(&name("gm.core")).unwrap();
        assert_eq!(model.imports_of(model.root()), vec![geo]);
        assert_eq!(model.imports_of(geo), vec![core]);
        assert!(model.imports_of(core).is_empty());
    }

    #[test]
    fn test_diamond_is_loaded_once() {
        let mut loads = Vec::new();
        let mut counting = |ns: &QualifiedName| {
            loads.push(ns.to_string());
            let source = match ns.to_string().as_str() {
                "left" => "namespace left\nimport base",
                "right" => "namespace right\nimport base",
                "base" => "namespace base\ntype Id",
                _ => return Err(LoadError::NotFound { searched: vec![] }),
            };
            Ok(parse(source)?)
        };

        let doc = parse("import left\nimport right").unwrap();
        let model = resolve(doc, &mut counting).unwrap();

        assert_eq!(loads, vec!["left", "base", "right"]);
        assert_eq!(model.namespaces().count(), 4);
        assert_eq!(model.import_graph().edge_count(), 4);
    }

    #[test]
    fn test_missing_namespace() {
        let doc = parse("namespace app\n\nimport gm.missing").unwrap();
        let err = resolve(doc, &mut MemoryLoader::new()).unwrap_err();

        assert_eq!(err.diagnostics().len(), 1);
        let diag = &err.diagnostics()[0];
        assert_eq!(diag.code(), Some(ErrorCode::E200));
        assert_eq!(diag.message(), "namespace `gm.missing` not found");
        assert_eq!(diag.primary_label().unwrap().span(), Span::new(22..32));
        assert_eq!(diag.help(), Some("searched: in-memory sources"));
    }

    #[test]
    fn test_indirect_cycle() {
        let mut loader = loader(&[
            ("a", "namespace a\nimport b"),
            ("b", "namespace b\nimport a"),
        ]);
        let doc = parse("namespace a\nimport b").unwrap();
        let err = resolve(doc, &mut loader).unwrap_err();

        assert!(err.has_kind(ErrorKind::ImportCycle));
        let diag = &err.diagnostics()[0];
        assert_eq!(diag.message(), "import cycle detected: a -> b -> a");
        assert_eq!(diag.origin(), Some("b"));
    }

    #[test]
    fn test_cycle_between_imports() {
        let mut loader = loader(&[
            ("a", "namespace a\nimport b"),
            ("b", "namespace b\nimport c"),
            ("c", "namespace c\nimport b"),
        ]);
        let doc = parse("import a").unwrap();
        let err = resolve(doc, &mut loader).unwrap_err();

        assert_eq!(
            err.diagnostics()[0].message(),
            "import cycle detected: b -> c -> b"
        );
    }

    #[test]
    fn test_self_import() {
        let doc = parse("namespace a\nimport a").unwrap();
        let err = resolve(doc, &mut MemoryLoader::new()).unwrap_err();

        assert!(err.has_kind(ErrorKind::ImportCycle));
        assert_eq!(err.diagnostics()[0].message(), "import cycle detected: a -> a");
    }

    #[test]
    fn test_invalid_import_keeps_its_origin() {
        let mut loader = loader(&[("broken", "node {")]);
        let doc = parse("import broken").unwrap();
        let err = resolve(doc, &mut loader).unwrap_err();

        let diag = &err.diagnostics()[0];
        assert_eq!(diag.code(), Some(ErrorCode::E100));
        assert_eq!(diag.origin(), Some("broken"));
    }
}

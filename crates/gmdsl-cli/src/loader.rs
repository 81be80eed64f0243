//! Filesystem namespace loader.
//!
//! `import a.b.C` is looked up first in the directory of the file that
//! declares the import, then in each search directory in turn. Every
//! directory is tried as `a.b.C.gm` and then as `a/b/C.gm`.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, trace};

use gmdsl::{
    Diagnostic, FrontendError, LoadError, NamespaceLoader, identifier::QualifiedName, model::Document,
};

/// File extension of schema sources.
pub const EXTENSION: &str = "gm";

/// Loads imported namespaces from `.gm` files.
///
/// Every text read is kept, keyed by the path it was read from, so that
/// diagnostics pointing into imported files can be rendered later.
#[derive(Debug, Default)]
pub struct FileLoader {
    root_dir: PathBuf,
    search_paths: Vec<PathBuf>,
    importer_dirs: HashMap<QualifiedName, PathBuf>,
    texts: HashMap<String, String>,
}

impl FileLoader {
    /// `root_dir` holds the root file and serves its imports; `search_paths`
    /// are tried after the importing file's own directory.
    pub fn new(root_dir: impl Into<PathBuf>, search_paths: Vec<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            search_paths,
            importer_dirs: HashMap::new(),
            texts: HashMap::new(),
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Texts of the files loaded so far, keyed by origin.
    pub fn texts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.texts
            .iter()
            .map(|(origin, text)| (origin.as_str(), text.as_str()))
    }

    /// The first file to import `name` decides where it is looked up first.
    fn importer_dir(&self, name: &QualifiedName) -> &Path {
        self.importer_dirs
            .get(name)
            .map_or(self.root_dir.as_path(), PathBuf::as_path)
    }

    fn candidates(&self, name: &QualifiedName) -> Vec<PathBuf> {
        let dotted = format!("{name}.{EXTENSION}");
        let nested: PathBuf = name.segments().iter().collect::<PathBuf>().with_extension(EXTENSION);

        let mut candidates = Vec::new();
        let dirs = std::iter::once(self.importer_dir(name))
            .chain(self.search_paths.iter().map(PathBuf::as_path));
        for dir in dirs {
            for path in [dir.join(&dotted), dir.join(&nested)] {
                if !candidates.contains(&path) {
                    candidates.push(path);
                }
            }
        }
        candidates
    }

    fn read(&mut self, path: &Path) -> Result<Document, LoadError> {
        let origin = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|err| io_error(&origin, &err))?;
        debug!(path = origin.as_str(), bytes = text.len(); "Read namespace file");

        let document = gmdsl_parser::parse_with_origin(&text, &origin);
        self.texts.insert(origin, text);
        let document = document?;

        let dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        for import in document.imports() {
            self.importer_dirs
                .entry(import.inner().clone())
                .or_insert_with(|| dir.clone());
        }
        Ok(document)
    }
}

impl NamespaceLoader for FileLoader {
    fn load(&mut self, name: &QualifiedName) -> Result<Document, LoadError> {
        let candidates = self.candidates(name);
        for path in &candidates {
            trace!(namespace = name.to_string(), path = path.display().to_string(); "Trying candidate");
            if path.is_file() {
                return self.read(path);
            }
        }

        Err(LoadError::NotFound {
            searched: candidates
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
        })
    }
}

fn io_error(origin: &str, err: &io::Error) -> LoadError {
    let diagnostic = Diagnostic::error(format!("failed to read `{origin}`: {err}"))
        .with_origin(Some(origin));
    LoadError::Invalid(FrontendError::from(diagnostic))
}

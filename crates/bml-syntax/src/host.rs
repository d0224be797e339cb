//! Module hosts
//!
//! The analyzer never reads files itself. It asks a [`ModuleHost`] for parsed
//! files and for the file an import specifier points at.
//!
//! Two hosts are provided:
//! - [`MemoryHost`]: files added from strings (tests, editor integrations)
//! - [`FsHost`]: files loaded from disk, parsed in parallel, cached by content

use crate::cache::ParseCache;
use crate::error::HostError;
use crate::language::Language;
use crate::source::{normalize, FileId, SourceFile};
use dashmap::DashMap;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source of parsed files for the analyzer
///
/// Implementations must be thread-safe; the resolver may be shared by a host
/// that analyzes files on several workers.
pub trait ModuleHost: Send + Sync {
    /// Parsed file for an id, loading it on demand if the host supports that
    fn source(&self, file: &FileId) -> Option<Arc<SourceFile>>;

    /// Check if a file exists (without necessarily parsing it)
    fn contains(&self, file: &FileId) -> bool;

    /// Resolve an import specifier written in `from` to a file id
    fn resolve_import(&self, from: &FileId, specifier: &str) -> Option<FileId> {
        resolve_specifier(from, specifier, |candidate| self.contains(candidate))
    }
}

/// Resolve a relative import specifier the way TypeScript's node resolution
/// does for source files.
///
/// Bare package specifiers (`'lodash'`, `'@scope/pkg'`) return `None`: the
/// analyzer only follows imports inside the analyzed project.
pub fn resolve_specifier(
    from: &FileId,
    specifier: &str,
    exists: impl Fn(&FileId) -> bool,
) -> Option<FileId> {
    let relative = specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../");
    if !relative {
        return None;
    }

    let dir = from.dir();
    let joined = if dir.is_empty() {
        specifier.to_string()
    } else {
        format!("{dir}/{specifier}")
    };
    let base = normalize(&joined);

    candidates(&base)
        .into_iter()
        .map(FileId::new)
        .find(|candidate| exists(candidate))
}

fn candidates(base: &str) -> Vec<String> {
    let mut out = Vec::new();

    // `import './x.js'` in ESM TypeScript refers to `./x.ts`
    let rewrites: [(&str, &[&str]); 4] = [
        (".js", &[".ts", ".tsx"]),
        (".jsx", &[".tsx"]),
        (".mjs", &[".mts"]),
        (".cjs", &[".cts"]),
    ];
    for (js, ts_exts) in rewrites {
        if let Some(stem) = base.strip_suffix(js) {
            out.extend(ts_exts.iter().map(|ts| format!("{stem}{ts}")));
        }
    }

    if Language::from_path(base).is_some() {
        out.push(base.to_string());
    }
    for ext in [".ts", ".tsx", ".js", ".jsx", ".mts"] {
        out.push(format!("{base}{ext}"));
    }
    for index in ["index.ts", "index.tsx", "index.js"] {
        out.push(format!("{base}/{index}"));
    }
    out
}

/// In-memory module host
#[derive(Debug, Default)]
pub struct MemoryHost {
    files: DashMap<FileId, Arc<SourceFile>>,
}

impl MemoryHost {
    /// Create empty host
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and add a file; the language is detected from the path
    ///
    /// # Errors
    /// Returns error if the extension is unsupported or parsing fails
    pub fn add(&self, path: &str, text: &str) -> Result<FileId, HostError> {
        let id = FileId::new(path);
        let file = SourceFile::parse_path(id.clone(), text)?;
        self.files.insert(id.clone(), Arc::new(file));
        Ok(id)
    }

    /// Add an already parsed file
    pub fn insert(&self, file: Arc<SourceFile>) {
        self.files.insert(file.id().clone(), file);
    }

    /// All file ids, sorted
    #[must_use]
    pub fn files(&self) -> Vec<FileId> {
        let mut ids: Vec<FileId> = self.files.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// All parsed files, sorted by id
    #[must_use]
    pub fn sources(&self) -> Vec<Arc<SourceFile>> {
        self.files()
            .iter()
            .filter_map(|id| self.source(id))
            .collect()
    }

    /// Number of files
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if host has no files
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ModuleHost for MemoryHost {
    fn source(&self, file: &FileId) -> Option<Arc<SourceFile>> {
        self.files.get(file).map(|entry| Arc::clone(entry.value()))
    }

    fn contains(&self, file: &FileId) -> bool {
        self.files.contains_key(file)
    }
}

/// File-system module host
///
/// Files passed to [`FsHost::load_all`] are parsed eagerly (in parallel);
/// files reached only through imports are loaded lazily on first lookup.
#[derive(Debug, Default)]
pub struct FsHost {
    files: DashMap<FileId, Arc<SourceFile>>,
    cache: ParseCache,
}

impl FsHost {
    /// Create host with a default parse cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create host sharing an existing parse cache
    #[inline]
    #[must_use]
    pub fn with_cache(cache: ParseCache) -> Self {
        Self {
            files: DashMap::new(),
            cache,
        }
    }

    /// Load and parse one file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(&self, path: &Path) -> Result<Arc<SourceFile>, HostError> {
        let id = FileId::new(path.to_string_lossy());
        if let Some(existing) = self.files.get(&id) {
            return Ok(Arc::clone(existing.value()));
        }

        let language = Language::from_path(id.as_str())
            .ok_or_else(|| HostError::UnsupportedFile { file: id.clone() })?;
        let text = std::fs::read_to_string(path).map_err(|e| HostError::io_error(path, e))?;
        let file = self.cache.get_or_parse(id.clone(), language, text)?;

        self.files.insert(id, Arc::clone(&file));
        Ok(file)
    }

    /// Load many files in parallel; results are returned in input order
    pub fn load_all(&self, paths: &[PathBuf]) -> Vec<Result<Arc<SourceFile>, HostError>> {
        paths.par_iter().map(|path| self.load(path)).collect()
    }

    /// Recursively collect analyzable files under `root`
    ///
    /// Skips hidden directories and `node_modules`. A `root` that is a file is
    /// returned as-is. Output is sorted for deterministic runs.
    ///
    /// # Errors
    /// Returns error if a directory cannot be read
    pub fn discover(root: &Path) -> Result<Vec<PathBuf>, HostError> {
        let mut out = Vec::new();
        if root.is_file() {
            out.push(root.to_path_buf());
            return Ok(out);
        }
        discover_into(root, &mut out)?;
        out.sort();
        Ok(out)
    }

    /// Ids of all loaded files, sorted
    #[must_use]
    pub fn files(&self) -> Vec<FileId> {
        let mut ids: Vec<FileId> = self.files.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Parse cache used by this host
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &ParseCache {
        &self.cache
    }
}

fn discover_into(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), HostError> {
    let entries = std::fs::read_dir(dir).map_err(|e| HostError::io_error(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| HostError::io_error(dir, e))?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if path.is_dir() {
            if name.starts_with('.') || name == "node_modules" {
                continue;
            }
            discover_into(&path, out)?;
        } else if Language::from_path(&name).is_some() {
            out.push(path);
        }
    }
    Ok(())
}

impl ModuleHost for FsHost {
    fn source(&self, file: &FileId) -> Option<Arc<SourceFile>> {
        if let Some(existing) = self.files.get(file) {
            return Some(Arc::clone(existing.value()));
        }
        match self.load(Path::new(file.as_str())) {
            Ok(loaded) => Some(loaded),
            Err(err) => {
                tracing::warn!(file = %file, error = %err, "could not load imported file");
                None
            }
        }
    }

    fn contains(&self, file: &FileId) -> bool {
        self.files.contains_key(file) || Path::new(file.as_str()).is_file()
    }
}

//! Parsed source files
//!
//! A [`SourceFile`] is the unit the analyzer consumes: the original text, the
//! tree-sitter tree built from it, and the [`FileId`] it was loaded under.

use crate::error::HostError;
use crate::hash::ContentHash;
use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Normalized, `/`-separated file identifier
///
/// Cheap to clone (shared string). Two ids are equal iff their normalized
/// paths are equal, so `src/./a.ts` and `src/a.ts` name the same file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(Arc<str>);

impl FileId {
    /// Create a file id, normalizing separators and `.`/`..` segments
    #[must_use]
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(Arc::from(normalize(path.as_ref())))
    }

    /// Path as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory containing this file (empty for top-level files)
    #[must_use]
    pub fn dir(&self) -> &str {
        match self.0.rfind('/') {
            Some(0) => "/",
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }
}

impl Display for FileId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Lexically normalize a path: unify separators, drop `.`, fold `..`
pub(crate) fn normalize(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(last) if *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

/// A parsed source file
#[derive(Debug)]
pub struct SourceFile {
    id: FileId,
    language: Language,
    text: String,
    tree: tree_sitter::Tree,
    hash: ContentHash,
}

impl SourceFile {
    /// Parse source text
    ///
    /// # Errors
    /// Returns error if the grammar cannot be loaded or tree-sitter gives up.
    /// Syntax errors are not failures: they appear as `ERROR` nodes in the tree.
    pub fn parse(id: FileId, language: Language, text: impl Into<String>) -> Result<Self, HostError> {
        let text = text.into();
        let hash = ContentHash::of_source(language.name(), &text);

        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&language.tree_sitter_language())
            .map_err(|e| HostError::ParserInit(e.to_string()))?;

        let tree = parser
            .parse(&text, None)
            .ok_or_else(|| HostError::ParseFailed { file: id.clone() })?;

        if tree.root_node().has_error() {
            tracing::debug!(file = %id, "source contains syntax errors");
        }

        Ok(Self {
            id,
            language,
            text,
            tree,
            hash,
        })
    }

    /// Parse, detecting language from the file extension
    ///
    /// # Errors
    /// Returns error if the extension is not a supported language or parsing fails
    pub fn parse_path(id: FileId, text: impl Into<String>) -> Result<Self, HostError> {
        let language = Language::from_path(id.as_str())
            .ok_or_else(|| HostError::UnsupportedFile { file: id.clone() })?;
        Self::parse(id, language, text)
    }

    /// Re-label an already parsed file (used when a cached parse is shared
    /// between two paths with identical content)
    #[must_use]
    pub fn with_id(&self, id: FileId) -> Self {
        Self {
            id,
            language: self.language,
            text: self.text.clone(),
            tree: self.tree.clone(),
            hash: self.hash,
        }
    }

    /// File identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> &FileId {
        &self.id
    }

    /// Source language
    #[inline]
    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    /// Source text
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Syntax tree
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &tree_sitter::Tree {
        &self.tree
    }

    /// Content hash of (language, text)
    #[inline]
    #[must_use]
    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    /// Text covered by a node
    #[inline]
    #[must_use]
    pub fn node_text(&self, node: &tree_sitter::Node<'_>) -> &str {
        node.utf8_text(self.text.as_bytes()).unwrap_or("")
    }
}

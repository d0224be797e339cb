//! Per-file index of annotations, classes and module bindings
//!
//! The resolver needs more than the records: it follows import bindings and
//! re-exports to find the class an identifier names in another file.

use crate::record::AnnotationRecord;
use bml_syntax::{FileId, Span};
use indexmap::IndexMap;
use std::sync::Arc;

/// A class declared at module scope
#[derive(Debug, Clone)]
pub struct ClassDecl {
    name: String,
    span: Span,
    exported: bool,
    records: Vec<Arc<AnnotationRecord>>,
}

impl ClassDecl {
    pub(crate) fn new(name: String, span: Span, exported: bool) -> Self {
        Self {
            name,
            span,
            exported,
            records: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, record: Arc<AnnotationRecord>) {
        self.records.push(record);
    }

    /// Class name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Span of the class declaration
    #[inline]
    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Declared with `export`
    #[inline]
    #[must_use]
    pub fn is_exported(&self) -> bool {
        self.exported
    }

    /// Class-level annotation records (method records excluded)
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[Arc<AnnotationRecord>] {
        &self.records
    }

    /// Check if the class carries any recognized annotation
    #[inline]
    #[must_use]
    pub fn is_annotated(&self) -> bool {
        !self.records.is_empty()
    }
}

/// An `import` binding, keyed by its local name in [`ModuleIndex`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
    /// `import { A }` / `import { A as B }`
    Named {
        /// Name exported by the target module
        imported: String,
        /// Module specifier
        specifier: String,
    },
    /// `import A from './x'`
    Default {
        /// Module specifier
        specifier: String,
    },
    /// `import * as ns from './x'`
    Namespace {
        /// Module specifier
        specifier: String,
    },
}

impl ImportBinding {
    /// Module specifier of the binding
    #[inline]
    #[must_use]
    pub fn specifier(&self) -> &str {
        match self {
            ImportBinding::Named { specifier, .. }
            | ImportBinding::Default { specifier }
            | ImportBinding::Namespace { specifier } => specifier,
        }
    }
}

/// An `export ... from` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReExport {
    /// `export { A } from './x'` / `export { A as B } from './x'`
    Named {
        /// Name seen by importers of this module
        exported: String,
        /// Name in the target module
        imported: String,
        /// Module specifier
        specifier: String,
    },
    /// `export * as ns from './x'`
    Namespace {
        /// Name seen by importers of this module
        exported: String,
        /// Module specifier
        specifier: String,
    },
    /// `export * from './x'`
    All {
        /// Module specifier
        specifier: String,
    },
}

/// Everything the analyzer knows about one file
#[derive(Debug, Clone)]
pub struct ModuleIndex {
    file: FileId,
    pub(crate) records: Vec<Arc<AnnotationRecord>>,
    pub(crate) classes: IndexMap<String, ClassDecl>,
    pub(crate) imports: IndexMap<String, ImportBinding>,
    pub(crate) exports: IndexMap<String, String>,
    pub(crate) re_exports: Vec<ReExport>,
}

impl ModuleIndex {
    pub(crate) fn new(file: FileId) -> Self {
        Self {
            file,
            records: Vec::new(),
            classes: IndexMap::new(),
            imports: IndexMap::new(),
            exports: IndexMap::new(),
            re_exports: Vec::new(),
        }
    }

    /// File this index describes
    #[inline]
    #[must_use]
    pub fn file(&self) -> &FileId {
        &self.file
    }

    /// All annotation records, in declaration order
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[Arc<AnnotationRecord>] {
        &self.records
    }

    /// Module-scope class by name
    #[inline]
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.get(name)
    }

    /// All module-scope classes, in declaration order
    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.classes.values()
    }

    /// Import binding for a local name
    #[inline]
    #[must_use]
    pub fn import(&self, local: &str) -> Option<&ImportBinding> {
        self.imports.get(local)
    }

    /// Local name behind an exported name (`export { A as B }` maps `B` to `A`;
    /// `export default A` maps `default` to `A`)
    #[inline]
    #[must_use]
    pub fn local_export(&self, exported: &str) -> Option<&str> {
        self.exports.get(exported).map(String::as_str)
    }

    /// `export ... from` declarations, in source order
    #[inline]
    #[must_use]
    pub fn re_exports(&self) -> &[ReExport] {
        &self.re_exports
    }
}

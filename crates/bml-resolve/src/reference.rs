//! Resolution results
//!
//! Every resolution ends in a [`ResolvedReference`]; there is no error path.
//! Rules branch on the variant and decide for themselves how serious an
//! unresolved reference is.

use bml_model::{AnnotationKind, AnnotationRecord};
use bml_syntax::FileId;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Why an identifier did not resolve to an annotated class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum UnresolvedReason {
    /// No class or import binding with this name
    NotFound {
        /// Identifier that was looked up
        name: String,
    },
    /// The class exists but carries no recognized annotation
    NotAnnotated {
        /// Class name
        class: String,
    },
    /// The import specifier does not name a file the host knows
    ModuleNotFound {
        /// Module specifier as written
        specifier: String,
    },
    /// Following imports/re-exports came back to an earlier step
    CircularImport {
        /// `file:name` steps, ending with the repeated one
        chain: Vec<String>,
    },
    /// The identifier is a namespace import (`import * as ns`)
    NamespaceImport {
        /// Identifier that was looked up
        name: String,
    },
}

impl Display for UnresolvedReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::NotFound { name } => write!(f, "'{name}' is not defined or imported"),
            UnresolvedReason::NotAnnotated { class } => {
                write!(f, "class '{class}' has no business-model annotation")
            }
            UnresolvedReason::ModuleNotFound { specifier } => {
                write!(f, "module '{specifier}' could not be found")
            }
            UnresolvedReason::CircularImport { chain } => {
                write!(f, "circular import: {}", chain.join(" -> "))
            }
            UnresolvedReason::NamespaceImport { name } => {
                write!(f, "'{name}' is a namespace import, not a class")
            }
        }
    }
}

/// An annotated class an identifier resolved to
#[derive(Debug, Clone)]
pub struct ResolvedClass {
    name: String,
    file: FileId,
    records: Vec<Arc<AnnotationRecord>>,
}

impl ResolvedClass {
    pub(crate) fn new(name: String, file: FileId, records: Vec<Arc<AnnotationRecord>>) -> Self {
        Self {
            name,
            file,
            records,
        }
    }

    /// Class name in its declaring file
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declaring file
    #[inline]
    #[must_use]
    pub fn file(&self) -> &FileId {
        &self.file
    }

    /// Class-level annotation records
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[Arc<AnnotationRecord>] {
        &self.records
    }

    /// Check if the class carries an annotation of `kind`
    #[inline]
    #[must_use]
    pub fn has_kind(&self, kind: AnnotationKind) -> bool {
        self.records.iter().any(|r| r.kind() == kind)
    }

    /// Record of the given kind, if present
    #[inline]
    #[must_use]
    pub fn record(&self, kind: AnnotationKind) -> Option<&Arc<AnnotationRecord>> {
        self.records.iter().find(|r| r.kind() == kind)
    }

    /// Comma-separated annotation kinds, for messages
    #[must_use]
    pub fn kinds_label(&self) -> String {
        self.records
            .iter()
            .map(|r| r.kind().name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Outcome of resolving one identifier
#[derive(Debug, Clone)]
pub enum ResolvedReference {
    /// Names an annotated class
    Annotated(ResolvedClass),
    /// Could not be followed to an annotated class
    Unresolved(UnresolvedReason),
}

impl ResolvedReference {
    /// The resolved class, if any
    #[inline]
    #[must_use]
    pub fn class(&self) -> Option<&ResolvedClass> {
        match self {
            ResolvedReference::Annotated(class) => Some(class),
            ResolvedReference::Unresolved(_) => None,
        }
    }

    /// The failure reason, if unresolved
    #[inline]
    #[must_use]
    pub fn reason(&self) -> Option<&UnresolvedReason> {
        match self {
            ResolvedReference::Annotated(_) => None,
            ResolvedReference::Unresolved(reason) => Some(reason),
        }
    }

    /// Check if resolution succeeded
    #[inline]
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolvedReference::Annotated(_))
    }

    /// Check if this resolved to a class annotated with `kind`
    #[inline]
    #[must_use]
    pub fn has_kind(&self, kind: AnnotationKind) -> bool {
        self.class().is_some_and(|class| class.has_kind(kind))
    }

    pub(crate) fn unresolved(reason: UnresolvedReason) -> Self {
        ResolvedReference::Unresolved(reason)
    }
}

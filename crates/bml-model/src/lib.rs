//! BML Model
//!
//! Data model of the business-model notation and the annotation extractor.
//!
//! # Overview
//!
//! - **AnnotationKind**: the thirteen recognized decorator names
//! - **FieldValue**: structural value of one annotation field
//! - **AnnotationRecord**: one recognized annotation application
//! - **ModuleIndex**: per-file records, class table and import/export bindings
//! - **extract_module**: builds a [`ModuleIndex`] from a parsed file
//!
//! # Example
//!
//! ```rust
//! use bml_model::{extract_module, AnnotationKind};
//! use bml_syntax::{FileId, SourceFile};
//!
//! let file = SourceFile::parse_path(
//!     FileId::new("personas.ts"),
//!     "@Persona({ name: 'Shopper', goals: ['buy'] })\nexport class Shopper {}",
//! )
//! .unwrap();
//!
//! let index = extract_module(&file);
//! let record = &index.records()[0];
//! assert_eq!(record.kind(), AnnotationKind::Persona);
//! assert_eq!(record.name(), Some("Shopper"));
//! assert!(index.class("Shopper").unwrap().is_exported());
//! ```

#![warn(missing_docs)]

pub mod extract;
pub mod kind;
pub mod module;
pub mod record;
pub mod value;

// Re-exports
pub use extract::extract_module;
pub use kind::{AnnotationKind, OwnerKind};
pub use module::{ClassDecl, ImportBinding, ModuleIndex, ReExport};
pub use record::{AnnotationRecord, Malformed};
pub use value::{FieldMap, FieldValue, Literal, Property, SkipReason, SkippedProperty, Spanned};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for rule authors
    pub use crate::{
        AnnotationKind, AnnotationRecord, FieldMap, FieldValue, Literal, ModuleIndex, OwnerKind,
        Property, Spanned,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! BML Resolve
//!
//! Follows identifiers in annotation fields to the annotated classes they
//! name, across files.
//!
//! # Example
//!
//! ```rust
//! use bml_resolve::Resolver;
//! use bml_model::AnnotationKind;
//! use bml_syntax::{FileId, MemoryHost};
//! use std::sync::Arc;
//!
//! let host = MemoryHost::new();
//! host.add("stakeholders.ts", "@Stakeholder({ name: 'Ops' }) export class Ops {}").unwrap();
//! host.add("journey.ts", "import { Ops } from './stakeholders';").unwrap();
//!
//! let resolver = Resolver::new(Arc::new(host));
//! let resolved = resolver.resolve("Ops", &FileId::new("journey.ts"));
//! assert!(resolved.has_kind(AnnotationKind::Stakeholder));
//!
//! // memoized: the same Arc comes back
//! let again = resolver.resolve("Ops", &FileId::new("journey.ts"));
//! assert!(Arc::ptr_eq(&resolved, &again));
//! ```

#![warn(missing_docs)]

pub mod reference;
pub mod resolver;

pub use reference::{ResolvedClass, ResolvedReference, UnresolvedReason};
pub use resolver::{Resolver, ResolverStats};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

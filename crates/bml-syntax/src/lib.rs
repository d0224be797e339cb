//! BML Syntax Layer
//!
//! The host side of the analyzer: turns source text into tree-sitter syntax
//! trees and lets the analyzer follow imports between files.
//!
//! # Core Concepts
//!
//! - [`SourceFile`]: parsed file (text + tree + [`FileId`])
//! - [`Span`] / [`TextRange`]: byte ranges with line/column positions
//! - [`ModuleHost`]: lookup of parsed files and import specifiers
//! - [`MemoryHost`] / [`FsHost`]: in-memory and file-system hosts
//! - [`ParseCache`]: content-addressed parse cache (moka)
//!
//! # Example
//!
//! ```rust
//! use bml_syntax::{MemoryHost, ModuleHost, FileId};
//!
//! let host = MemoryHost::new();
//! host.add("src/a.ts", "export class A {}").unwrap();
//! host.add("src/b.ts", "import { A } from './a';").unwrap();
//!
//! let target = host.resolve_import(&FileId::new("src/b.ts"), "./a");
//! assert_eq!(target, Some(FileId::new("src/a.ts")));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod cache;
mod error;
mod hash;
mod host;
mod language;
mod source;
mod span;

pub use cache::{CacheStats, ParseCache};
pub use error::HostError;
pub use hash::ContentHash;
pub use host::{resolve_specifier, FsHost, MemoryHost, ModuleHost};
pub use language::Language;
pub use source::{FileId, SourceFile};
pub use span::{Position, Span, TextRange};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

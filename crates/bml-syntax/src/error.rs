//! Error types for the host layer
//!
//! These cover loading and parsing files. Once a file is parsed the analyzer
//! itself never fails; it reports problems as findings.

use crate::source::FileId;
use std::path::PathBuf;

/// Errors while loading or parsing source files
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// File extension is not a supported language
    #[error("unsupported file type: {file}")]
    UnsupportedFile { file: FileId },

    /// Grammar could not be loaded into the parser
    #[error("parser initialization failed: {0}")]
    ParserInit(String),

    /// tree-sitter returned no tree
    #[error("parse failed for {file}")]
    ParseFailed { file: FileId },

    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HostError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

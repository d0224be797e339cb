//! BML Lint
//!
//! Rule engine for business-model annotations.
//!
//! # Overview
//!
//! - **Rule**: id, category, applicable kinds, scope-tagged check function, optional fix
//! - **RuleRegistry**: the static set of built-in rules
//! - **Profile / LintConfig**: severities per rule, validated against the registry at startup
//! - **Analyzer**: runs record rules per file, then graph rules over the whole run
//! - **TriggerGraph**: Action trigger graph for cycle and reachability checks
//! - **apply_fixes**: applies non-overlapping text edits
//!
//! # Example
//!
//! ```rust
//! use bml_lint::{run_all, LintConfig};
//! use bml_syntax::MemoryHost;
//! use std::sync::Arc;
//!
//! let host = Arc::new(MemoryHost::new());
//! let file = host
//!     .add(
//!         "actions.ts",
//!         "@Action({ name: 'A', triggers: [B] }) class A {}\n\
//!          @Action({ name: 'B', triggers: [A] }) class B {}",
//!     )
//!     .unwrap();
//!
//! let report = run_all(host, &[file], &LintConfig::new()).unwrap();
//! let cycle = report.findings_for("action-no-trigger-cycles").next().unwrap();
//! assert!(cycle.message.contains("A -> B -> A"));
//! ```

#![warn(missing_docs)]

pub mod analyzer;
pub mod config;
pub mod error;
pub mod finding;
pub mod fix;
pub mod graph;
pub mod profile;
pub mod registry;
pub mod rule;
mod rules;
pub mod schema;
pub mod severity;
pub mod support;

// Re-exports
pub use analyzer::{run_all, Analyzer, Report, RunStats};
pub use config::{LintConfig, SeverityTable, CONFIG_FILE};
pub use error::ConfigError;
pub use finding::{Diagnostic, Finding};
pub use fix::{apply_fixes, removal_range, FixOutcome, TextEdit};
pub use graph::TriggerGraph;
pub use profile::Profile;
pub use registry::RuleRegistry;
pub use rule::{Category, CheckFn, FixContext, RecordSet, Rule, RuleContext, UnresolvedPolicy};
pub use severity::Severity;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for hosts and custom rules
    pub use crate::{
        run_all, Analyzer, Category, ConfigError, Diagnostic, Finding, LintConfig, Profile, Report,
        Rule, RuleContext, RuleRegistry, Severity, TextEdit,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

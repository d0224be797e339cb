//! Testing utilities for BML workspace
//!
//! Shared fixtures: in-memory hosts built from snippets, one-call analysis,
//! and small annotation source builders.

#![allow(missing_docs)]

use bml_lint::{run_all, Finding, LintConfig, Profile, Report};
use bml_syntax::{FileId, MemoryHost};
use std::sync::Arc;

pub fn host(files: &[(&str, &str)]) -> (Arc<MemoryHost>, Vec<FileId>) {
    let host = Arc::new(MemoryHost::new());
    let ids = files
        .iter()
        .map(|(path, text)| host.add(path, text).unwrap())
        .collect();
    (host, ids)
}

pub fn analyze_with(files: &[(&str, &str)], config: &LintConfig) -> Report {
    let (host, ids) = host(files);
    run_all(host, &ids, config).unwrap()
}

/// Recommended profile, no fixes
pub fn analyze(files: &[(&str, &str)]) -> Report {
    analyze_with(files, &LintConfig::new())
}

/// `all` profile with fixes attached
pub fn analyze_strict(files: &[(&str, &str)]) -> Report {
    analyze_with(files, &LintConfig::new().with_profile(Profile::All).with_fix(true))
}

pub fn findings<'a>(report: &'a Report, rule_id: &'a str) -> Vec<&'a Finding> {
    report.findings_for(rule_id).collect()
}

pub fn message_ids<'a>(report: &'a Report, rule_id: &'a str) -> Vec<&'static str> {
    report.findings_for(rule_id).map(|f| f.message_id).collect()
}

/// `@Action({ name: 'A', triggers: [B, C] }) export class A {}`
pub fn action(name: &str, triggers: &[&str]) -> String {
    format!(
        "@Action({{ name: '{name}', description: '{name}', triggers: [{}] }})\nexport class {name} {{}}\n",
        triggers.join(", ")
    )
}

/// Initiative with a budget and a breakdown of the given entries
pub fn initiative(budget: &str, breakdown: &[(&str, &str)]) -> String {
    let entries: Vec<String> = breakdown.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    format!(
        "@BusinessInitiative({{ name: 'Expand', budget: {budget}, budgetBreakdown: {{ {} }} }})\nexport class Expand {{}}\n",
        entries.join(", ")
    )
}

/// Initiative with only a timeline
pub fn timeline(start: &str, end: &str) -> String {
    format!(
        "@BusinessInitiative({{ name: 'Launch', timeline: {{ start: '{start}', end: '{end}' }} }})\nexport class Launch {{}}\n"
    )
}

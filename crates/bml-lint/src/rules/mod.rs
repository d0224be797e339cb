//! Built-in rules, one module per annotation kind plus the generic rules

mod action;
mod behavior;
mod collaboration;
mod context;
mod expectation;
mod generic;
mod initiative;
mod interaction;
mod journey;
mod metric;
mod persona;
mod stakeholder;
mod strategy;
mod witness;

use crate::rule::Rule;

/// Every built-in rule, generic rules first
pub(crate) fn all() -> Vec<Rule> {
    [
        generic::rules(),
        strategy::rules(),
        context::rules(),
        persona::rules(),
        stakeholder::rules(),
        journey::rules(),
        action::rules(),
        expectation::rules(),
        interaction::rules(),
        behavior::rules(),
        witness::rules(),
        collaboration::rules(),
        metric::rules(),
        initiative::rules(),
    ]
    .concat()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::analyzer::{run_all, Report};
    use crate::config::LintConfig;
    use crate::fix::apply_fixes;
    use crate::profile::Profile;
    use bml_syntax::MemoryHost;
    use std::sync::Arc;

    /// Lint one file under the `all` profile with fixes attached
    pub(crate) fn lint(source: &str) -> Report {
        let host = Arc::new(MemoryHost::new());
        let file = host.add("model.ts", source).unwrap();
        let config = LintConfig::new().with_profile(Profile::All).with_fix(true);
        run_all(host, &[file], &config).unwrap()
    }

    /// Rule ids of every finding, in report order
    pub(crate) fn ids(report: &Report) -> Vec<&'static str> {
        report.findings.iter().map(|f| f.rule_id).collect()
    }

    /// Message ids reported by one rule, in report order
    pub(crate) fn messages(report: &Report, rule_id: &str) -> Vec<&'static str> {
        report.findings_for(rule_id).map(|f| f.message_id).collect()
    }

    /// Source after one pass of every attached fix
    pub(crate) fn fixed(source: &str) -> String {
        let report = lint(source);
        apply_fixes(source, report.findings.into_iter().filter_map(|f| f.fix)).text
    }
}

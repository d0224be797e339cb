//! Expectation rules

use crate::finding::Diagnostic;
use crate::fix::TextEdit;
use crate::rule::Category::{BestPractice, Structural};
use crate::rule::{FixContext, Rule, RuleContext};
use crate::schema::PRIORITIES;
use crate::support::{self, fmt_number};
use bml_model::{AnnotationKind, AnnotationRecord};

const EXPECTATION: &[AnnotationKind] = &[AnnotationKind::Expectation];

/// `p50 <= p95 <= p99 <= max`
pub(super) const PERCENTILES: &[&str] = &["p50", "p95", "p99", "max"];

pub(crate) fn rules() -> Vec<Rule> {
    vec![
        Rule::record(
            "expectation-valid-priority",
            "priority is must, should, could or wont",
            Structural,
            EXPECTATION,
            |r, _| support::check_enum(r, "priority", PRIORITIES),
        )
        .with_fix(fix_priority),
        Rule::record(
            "expectation-require-criteria",
            "Expectation lists acceptance criteria",
            BestPractice,
            EXPECTATION,
            |r, _| support::require_list(r, "criteria", "missingCriteria"),
        ),
        Rule::record(
            "expectation-metric-reference",
            "metric references a Metric class",
            Structural,
            EXPECTATION,
            |r, ctx| support::check_reference_field(r, ctx, "metric", &[AnnotationKind::Metric]),
        ),
        Rule::record(
            "expectation-action-reference",
            "action references an Action class",
            Structural,
            EXPECTATION,
            |r, ctx| support::check_reference_field(r, ctx, "action", &[AnnotationKind::Action]),
        ),
        Rule::record(
            "expectation-latency-percentile-order",
            "Latency percentiles are non-decreasing",
            Structural,
            EXPECTATION,
            |r, _| support::check_order(r, "latency", PERCENTILES, true, "percentileOrder"),
        ),
        Rule::record(
            "expectation-latency-realistic",
            "Latency values are within (0, 60000] ms",
            BestPractice,
            EXPECTATION,
            |r, _| support::check_latency_band(r, "latency"),
        ),
        Rule::record(
            "expectation-availability-range",
            "availability is a percentage from 0 to 100",
            Structural,
            EXPECTATION,
            availability,
        ),
    ]
}

fn fix_priority(_: &AnnotationRecord, diagnostic: &Diagnostic, ctx: &FixContext<'_>) -> Option<TextEdit> {
    support::case_fix(diagnostic, ctx, PRIORITIES)
}

fn availability(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(prop) = record.field("availability") else {
        return Vec::new();
    };
    match prop.value.value.as_number() {
        Some(value) if !(0.0..=100.0).contains(&value) => vec![Diagnostic::on(
            record,
            prop.value.span,
            "availabilityOutOfRange",
            format!("availability {} is not a percentage from 0 to 100", fmt_number(value)),
        )],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use crate::rules::test_support::{fixed, lint, messages};
    use pretty_assertions::assert_eq;

    fn expectation(fields: &str) -> String {
        format!(
            "@Action({{ name: 'Checkout' }}) class Checkout {{}}\n\
             @Metric({{ name: 'Conversion', unit: '%' }}) class Conversion {{}}\n\
             @Expectation({{ name: 'Fast', {fields} }}) class Fast {{}}"
        )
    }

    #[test]
    fn priority_case_is_fixed() {
        let source = expectation("criteria: ['c'], priority: 'MUST'");
        assert_eq!(messages(&lint(&source), "expectation-valid-priority"), vec!["invalidValue"]);
        assert!(fixed(&source).contains("priority: 'must'"));

        let report = lint(&expectation("criteria: ['c'], priority: 'maybe'"));
        assert!(report.findings_for("expectation-valid-priority").all(|f| f.fix.is_none()));
        let report = lint(&expectation("criteria: ['c'], priority: 'should'"));
        assert!(messages(&report, "expectation-valid-priority").is_empty());
    }

    #[test]
    fn criteria_are_required() {
        let report = lint(&expectation("priority: 'must'"));
        assert_eq!(messages(&report, "expectation-require-criteria"), vec!["missingCriteria"]);
        let report = lint(&expectation("criteria: ['Responds within 2s']"));
        assert!(messages(&report, "expectation-require-criteria").is_empty());
    }

    #[test]
    fn metric_and_action_references() {
        let report = lint(&expectation("criteria: ['c'], metric: Checkout, action: Ghost"));
        assert_eq!(messages(&report, "expectation-metric-reference"), vec!["wrongKind"]);
        assert_eq!(messages(&report, "expectation-action-reference"), vec!["unresolvedReference"]);

        let report = lint(&expectation("criteria: ['c'], metric: Conversion, action: Checkout"));
        assert!(messages(&report, "expectation-metric-reference").is_empty());
        assert!(messages(&report, "expectation-action-reference").is_empty());
    }

    #[test]
    fn latency_percentiles() {
        let report = lint(&expectation("criteria: ['c'], latency: { p50: 300, p95: 200, p99: 400 }"));
        let found: Vec<_> = report.findings_for("expectation-latency-percentile-order").collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "latency.p50 (300) must be <= latency.p95 (200)");
        assert!(messages(&report, "expectation-latency-realistic").is_empty());

        let report = lint(&expectation("criteria: ['c'], latency: { p50: 0, max: 120000 }"));
        assert!(messages(&report, "expectation-latency-percentile-order").is_empty());
        assert_eq!(
            messages(&report, "expectation-latency-realistic"),
            vec!["unrealisticLatency", "unrealisticLatency"]
        );

        let report = lint(&expectation("criteria: ['c'], latency: { p50: 100, p95: 250, p99: 250, max: 900 }"));
        assert!(messages(&report, "expectation-latency-percentile-order").is_empty());
        assert!(messages(&report, "expectation-latency-realistic").is_empty());
    }

    #[test]
    fn availability_is_a_percentage() {
        for bad in ["101", "-1"] {
            let report = lint(&expectation(&format!("criteria: ['c'], availability: {bad}")));
            assert_eq!(messages(&report, "expectation-availability-range"), vec!["availabilityOutOfRange"]);
        }
        for good in ["0", "99.9", "100"] {
            let report = lint(&expectation(&format!("criteria: ['c'], availability: {good}")));
            assert!(messages(&report, "expectation-availability-range").is_empty());
        }
    }
}

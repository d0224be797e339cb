//! Metric rules

use crate::finding::Diagnostic;
use crate::fix::TextEdit;
use crate::rule::Category::{BestPractice, Structural};
use crate::rule::{FixContext, Rule, RuleContext, UnresolvedPolicy};
use crate::schema::{DIRECTIONS, FREQUENCIES};
use crate::support::{self, fmt_number};
use bml_model::{AnnotationKind, AnnotationRecord, FieldValue};

const METRIC: &[AnnotationKind] = &[AnnotationKind::Metric];

const THRESHOLDS: &[&str] = &["healthy", "warning", "critical"];

pub(crate) fn rules() -> Vec<Rule> {
    vec![
        Rule::record("metric-require-unit", "Metric states its unit", Structural, METRIC, |r, _| {
            support::require_text(r, "unit", "missingUnit")
        }),
        Rule::record(
            "metric-valid-direction",
            "direction is higherIsBetter or lowerIsBetter",
            Structural,
            METRIC,
            |r, _| support::check_enum(r, "direction", DIRECTIONS),
        )
        .with_fix(fix_direction),
        Rule::record(
            "metric-threshold-order",
            "Thresholds are ordered by direction",
            Structural,
            METRIC,
            threshold_order,
        ),
        Rule::record(
            "metric-target-within-healthy",
            "target is on the healthy side of thresholds.healthy",
            BestPractice,
            METRIC,
            target_within_healthy,
        ),
        Rule::record(
            "metric-valid-frequency",
            "frequency is one of the known reporting frequencies",
            Structural,
            METRIC,
            |r, _| support::check_enum(r, "frequency", FREQUENCIES),
        )
        .with_fix(fix_frequency),
        Rule::record(
            "metric-owner-reference",
            "owner references a Stakeholder class",
            BestPractice,
            METRIC,
            |r, ctx| support::check_reference_field(r, ctx, "owner", &[AnnotationKind::Stakeholder]),
        )
        .with_unresolved(UnresolvedPolicy::Warn),
        Rule::record("metric-baseline-numeric", "baseline is a number", Structural, METRIC, baseline_numeric),
    ]
}

fn fix_direction(_: &AnnotationRecord, diagnostic: &Diagnostic, ctx: &FixContext<'_>) -> Option<TextEdit> {
    support::case_fix(diagnostic, ctx, DIRECTIONS)
}

fn fix_frequency(_: &AnnotationRecord, diagnostic: &Diagnostic, ctx: &FixContext<'_>) -> Option<TextEdit> {
    support::case_fix(diagnostic, ctx, FREQUENCIES)
}

/// `Some(true)` when higher values are better; `None` for a missing or unknown direction
fn higher_is_better(record: &AnnotationRecord) -> Option<bool> {
    match record.value("direction")?.as_str()? {
        "higherIsBetter" => Some(true),
        "lowerIsBetter" => Some(false),
        _ => None,
    }
}

fn threshold_order(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    match higher_is_better(record) {
        // higher is better: healthy >= warning >= critical
        Some(higher) => support::check_order(record, "thresholds", THRESHOLDS, !higher, "thresholdOrder"),
        None => Vec::new(),
    }
}

fn target_within_healthy(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let (Some(higher), Some(target), Some(healthy)) = (
        higher_is_better(record),
        record.field("target"),
        record.fields().object("thresholds").and_then(|t| t.number("healthy")),
    ) else {
        return Vec::new();
    };
    let Some(value) = target.value.value.as_number() else {
        return Vec::new();
    };
    let (ok, relation) = if higher {
        (value >= healthy, ">=")
    } else {
        (value <= healthy, "<=")
    };
    if ok {
        return Vec::new();
    }
    vec![Diagnostic::on(
        record,
        target.value.span,
        "targetOutsideHealthy",
        format!(
            "target {} should be {relation} thresholds.healthy ({})",
            fmt_number(value),
            fmt_number(healthy)
        ),
    )]
}

fn baseline_numeric(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(prop) = record.field("baseline") else {
        return Vec::new();
    };
    match &prop.value.value {
        FieldValue::Literal(bml_model::Literal::Number(_)) | FieldValue::Opaque(_) => Vec::new(),
        value if value.is_nullish() => Vec::new(),
        value => vec![Diagnostic::on(
            record,
            prop.value.span,
            "nonNumericBaseline",
            format!("baseline must be a number, found {}", value.type_name()),
        )],
    }
}

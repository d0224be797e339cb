//! Journey rules

use crate::finding::Diagnostic;
use crate::fix::{removal_range, TextEdit};
use crate::rule::Category::{BestPractice, Structural};
use crate::rule::{FixContext, Rule, RuleContext};
use crate::schema::PEOPLE;
use crate::support::{self, JOURNEY_DURATION};
use bml_model::{AnnotationKind, AnnotationRecord, FieldValue};
use std::collections::HashSet;

const JOURNEY: &[AnnotationKind] = &[AnnotationKind::Journey];

pub(crate) fn rules() -> Vec<Rule> {
    vec![
        Rule::record(
            "journey-require-primary-stakeholder",
            "Journey names its primary stakeholder",
            Structural,
            JOURNEY,
            require_primary,
        ),
        Rule::record(
            "journey-primary-stakeholder-reference",
            "primaryStakeholder references a Stakeholder or Persona class",
            Structural,
            JOURNEY,
            |r, ctx| support::check_reference_field(r, ctx, "primaryStakeholder", PEOPLE),
        ),
        Rule::record(
            "journey-secondary-stakeholders-reference",
            "secondaryStakeholders reference Stakeholder or Persona classes",
            Structural,
            JOURNEY,
            |r, ctx| support::check_reference_field(r, ctx, "secondaryStakeholders", PEOPLE),
        ),
        Rule::record(
            "journey-no-duplicate-stakeholders",
            "No stakeholder is listed twice",
            BestPractice,
            JOURNEY,
            duplicate_stakeholders,
        )
        .with_fix(remove_element),
        Rule::record(
            "journey-actions-reference",
            "actions reference Action classes",
            Structural,
            JOURNEY,
            |r, ctx| support::check_reference_field(r, ctx, "actions", &[AnnotationKind::Action]),
        ),
        Rule::record(
            "journey-entry-action-reference",
            "entryAction references an Action class",
            Structural,
            JOURNEY,
            |r, ctx| support::check_reference_field(r, ctx, "entryAction", &[AnnotationKind::Action]),
        ),
        Rule::record(
            "journey-entry-action-in-actions",
            "entryAction is one of the journey's actions",
            BestPractice,
            JOURNEY,
            entry_in_actions,
        ),
        Rule::record("journey-require-outcomes", "Journey lists its outcomes", BestPractice, JOURNEY, |r, _| {
            support::require_list(r, "outcomes", "missingOutcomes")
        }),
        Rule::record(
            "journey-metrics-reference",
            "metrics reference Metric classes",
            Structural,
            JOURNEY,
            |r, ctx| support::check_reference_field(r, ctx, "metrics", &[AnnotationKind::Metric]),
        ),
        Rule::record(
            "journey-duration-format",
            "estimatedDuration is a duration string",
            Structural,
            JOURNEY,
            |r, _| support::check_duration_format(r, "estimatedDuration"),
        ),
        Rule::record(
            "journey-duration-realistic",
            "estimatedDuration is between 1s and 90d",
            BestPractice,
            JOURNEY,
            |r, _| support::check_duration_band(r, "estimatedDuration", JOURNEY_DURATION),
        ),
    ]
}

/// Identifier or string naming a stakeholder
pub(super) fn participant_name(value: &FieldValue) -> Option<&str> {
    value.as_reference().or_else(|| value.as_str())
}

fn require_primary(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    match record.value("primaryStakeholder") {
        Some(value) if !value.is_nullish() => Vec::new(),
        _ => vec![Diagnostic::on(
            record,
            record.span(),
            "missingPrimaryStakeholder",
            format!("Journey '{}' is missing 'primaryStakeholder'", record.owner_name()),
        )],
    }
}

fn duplicate_stakeholders(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(secondary) = record.fields().list("secondaryStakeholders") else {
        return Vec::new();
    };
    let primary = record.value("primaryStakeholder").and_then(participant_name);

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in secondary {
        let Some(name) = participant_name(&item.value) else {
            continue;
        };
        let message = if primary == Some(name) {
            format!("'{name}' is already the primary stakeholder")
        } else if !seen.insert(name) {
            format!("'{name}' is listed more than once in secondaryStakeholders")
        } else {
            continue;
        };
        out.push(Diagnostic::on(record, item.span, "duplicateStakeholder", message).with_fix());
    }
    out
}

/// Remove a list element together with its separator
pub(super) fn remove_element(_: &AnnotationRecord, diagnostic: &Diagnostic, ctx: &FixContext<'_>) -> Option<TextEdit> {
    Some(TextEdit::delete(removal_range(ctx.text, diagnostic.span.range)))
}

fn entry_in_actions(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let (Some(entry), Some(actions)) = (record.field("entryAction"), record.fields().list("actions")) else {
        return Vec::new();
    };
    let Some(name) = entry.value.value.as_reference() else {
        return Vec::new();
    };
    if actions.iter().any(|a| a.value.as_reference() == Some(name)) {
        return Vec::new();
    }
    vec![Diagnostic::on(
        record,
        entry.value.span,
        "entryActionNotListed",
        format!("entryAction '{name}' is not listed in actions"),
    )]
}

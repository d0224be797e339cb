//! Witness rules

use crate::finding::Diagnostic;
use crate::fix::TextEdit;
use crate::rule::Category::{BestPractice, Structural};
use crate::rule::{FixContext, Rule};
use crate::schema::WITNESS_KINDS;
use crate::support::{self, WITNESS_TIMEOUT};
use bml_model::{AnnotationKind, AnnotationRecord};

const WITNESS: &[AnnotationKind] = &[AnnotationKind::Witness];

pub(crate) fn rules() -> Vec<Rule> {
    vec![
        Rule::record(
            "witness-behavior-reference",
            "behavior references a Behavior class",
            Structural,
            WITNESS,
            |r, ctx| support::check_reference_field(r, ctx, "behavior", &[AnnotationKind::Behavior]),
        ),
        Rule::record(
            "witness-valid-kind",
            "kind is unit, integration, e2e, manual or monitor",
            Structural,
            WITNESS,
            |r, _| support::check_enum(r, "kind", WITNESS_KINDS),
        )
        .with_fix(fix_kind),
        Rule::record("witness-require-evidence", "Witness names its evidence", BestPractice, WITNESS, |r, _| {
            support::require_text(r, "evidence", "missingEvidence")
        }),
        Rule::record("witness-timeout-format", "timeout is a duration string", Structural, WITNESS, |r, _| {
            support::check_duration_format(r, "timeout")
        }),
        Rule::record(
            "witness-timeout-realistic",
            "timeout is between 1s and 1h",
            BestPractice,
            WITNESS,
            |r, _| support::check_duration_band(r, "timeout", WITNESS_TIMEOUT),
        ),
    ]
}

fn fix_kind(_: &AnnotationRecord, diagnostic: &Diagnostic, ctx: &FixContext<'_>) -> Option<TextEdit> {
    support::case_fix(diagnostic, ctx, WITNESS_KINDS)
}

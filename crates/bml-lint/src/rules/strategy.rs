//! Strategy rules

use crate::finding::Diagnostic;
use crate::fix::TextEdit;
use crate::rule::Category::Structural;
use crate::rule::{FixContext, Rule, RuleContext};
use crate::schema::TIME_HORIZONS;
use crate::support;
use bml_model::{AnnotationKind, AnnotationRecord};

const STRATEGY: &[AnnotationKind] = &[AnnotationKind::Strategy];

pub(crate) fn rules() -> Vec<Rule> {
    vec![
        Rule::record("strategy-require-vision", "Strategy states a vision", Structural, STRATEGY, |r, _| {
            support::require_text(r, "vision", "missingVision")
        }),
        Rule::record(
            "strategy-require-objectives",
            "Strategy lists at least one objective",
            Structural,
            STRATEGY,
            |r, _| support::require_list(r, "objectives", "missingObjectives"),
        ),
        Rule::record(
            "strategy-valid-time-horizon",
            "timeHorizon is short, medium or long",
            Structural,
            STRATEGY,
            |r, _| support::check_enum(r, "timeHorizon", TIME_HORIZONS),
        )
        .with_fix(fix_time_horizon),
        Rule::record(
            "strategy-initiatives-reference",
            "initiatives reference BusinessInitiative classes",
            Structural,
            STRATEGY,
            initiatives,
        ),
    ]
}

fn fix_time_horizon(_: &AnnotationRecord, diagnostic: &Diagnostic, ctx: &FixContext<'_>) -> Option<TextEdit> {
    support::case_fix(diagnostic, ctx, TIME_HORIZONS)
}

fn initiatives(record: &AnnotationRecord, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    support::check_reference_field(record, ctx, "initiatives", &[AnnotationKind::BusinessInitiative])
}

//! Stakeholder rules

use crate::finding::Diagnostic;
use crate::fix::TextEdit;
use crate::rule::Category::{BestPractice, Structural};
use crate::rule::{FixContext, Rule, UnresolvedPolicy};
use crate::schema::LEVELS;
use crate::support;
use bml_model::{AnnotationKind, AnnotationRecord};

const STAKEHOLDER: &[AnnotationKind] = &[AnnotationKind::Stakeholder];

pub(crate) fn rules() -> Vec<Rule> {
    vec![
        Rule::record("stakeholder-require-role", "Stakeholder states a role", Structural, STAKEHOLDER, |r, _| {
            support::require_text(r, "role", "missingRole")
        }),
        Rule::record(
            "stakeholder-persona-reference",
            "persona references a Persona class",
            Structural,
            STAKEHOLDER,
            |r, ctx| support::check_reference_field(r, ctx, "persona", &[AnnotationKind::Persona]),
        ),
        Rule::record(
            "stakeholder-valid-influence",
            "influence is low, medium or high",
            Structural,
            STAKEHOLDER,
            |r, _| support::check_enum(r, "influence", LEVELS),
        )
        .with_fix(fix_level),
        Rule::record(
            "stakeholder-valid-interest",
            "interest is low, medium or high",
            Structural,
            STAKEHOLDER,
            |r, _| support::check_enum(r, "interest", LEVELS),
        )
        .with_fix(fix_level),
        Rule::record(
            "stakeholder-context-reference",
            "context references a Context class",
            BestPractice,
            STAKEHOLDER,
            |r, ctx| support::check_reference_field(r, ctx, "context", &[AnnotationKind::Context]),
        )
        .with_unresolved(UnresolvedPolicy::Warn),
    ]
}

fn fix_level(_: &AnnotationRecord, diagnostic: &Diagnostic, ctx: &FixContext<'_>) -> Option<TextEdit> {
    support::case_fix(diagnostic, ctx, LEVELS)
}

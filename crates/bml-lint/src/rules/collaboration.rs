//! Collaboration rules

use super::journey::{participant_name, remove_element};
use crate::finding::Diagnostic;
use crate::rule::Category::{BestPractice, Structural};
use crate::rule::{Rule, RuleContext};
use crate::schema::PEOPLE;
use crate::support;
use bml_model::{AnnotationKind, AnnotationRecord};
use std::collections::HashSet;

const COLLABORATION: &[AnnotationKind] = &[AnnotationKind::Collaboration];

const MIN_PARTICIPANTS: usize = 2;

pub(crate) fn rules() -> Vec<Rule> {
    vec![
        Rule::record(
            "collaboration-min-participants",
            "Collaboration has at least two participants",
            Structural,
            COLLABORATION,
            min_participants,
        ),
        Rule::record(
            "collaboration-participants-reference",
            "participants reference Stakeholder or Persona classes",
            Structural,
            COLLABORATION,
            |r, ctx| support::check_reference_field(r, ctx, "participants", PEOPLE),
        ),
        Rule::record(
            "collaboration-no-duplicate-participants",
            "No participant is listed twice",
            BestPractice,
            COLLABORATION,
            duplicate_participants,
        )
        .with_fix(remove_element),
        Rule::record(
            "collaboration-require-purpose",
            "Collaboration states its purpose",
            BestPractice,
            COLLABORATION,
            |r, _| support::require_text(r, "purpose", "missingPurpose"),
        ),
    ]
}

fn min_participants(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let (count, span) = match record.field("participants") {
        None => (0, record.span()),
        Some(prop) => match prop.value.value.as_list() {
            Some(items) => (items.len(), prop.value.span),
            None => return Vec::new(),
        },
    };
    if count >= MIN_PARTICIPANTS {
        return Vec::new();
    }
    vec![Diagnostic::on(
        record,
        span,
        "tooFewParticipants",
        format!(
            "Collaboration '{}' needs at least {MIN_PARTICIPANTS} participants, found {count}",
            record.owner_name()
        ),
    )]
}

fn duplicate_participants(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(items) = record.fields().list("participants") else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(|item| {
            let name = participant_name(&item.value)?;
            (!seen.insert(name)).then(|| {
                Diagnostic::on(
                    record,
                    item.span,
                    "duplicateParticipant",
                    format!("'{name}' is listed more than once in participants"),
                )
                .with_fix()
            })
        })
        .collect()
}

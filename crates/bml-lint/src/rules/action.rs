//! Action rules
//!
//! Includes the two graph rules over the trigger graph: cycle detection and
//! reachability from journeys.

use crate::finding::Diagnostic;
use crate::graph::TriggerProblem;
use crate::rule::Category::{BestPractice, Structural};
use crate::rule::{Rule, RuleContext};
use crate::schema::PEOPLE;
use crate::support::{self, ACTION_TIMEOUT};
use bml_model::{AnnotationKind, AnnotationRecord, FieldValue, OwnerKind};
use bml_resolve::ResolvedReference;

const ACTION: &[AnnotationKind] = &[AnnotationKind::Action];

const MAX_RETRY_ATTEMPTS: f64 = 10.0;

pub(crate) fn rules() -> Vec<Rule> {
    vec![
        Rule::record(
            "action-actor-reference",
            "actor references a Stakeholder or Persona class",
            Structural,
            ACTION,
            |r, ctx| support::check_reference_field(r, ctx, "actor", PEOPLE),
        ),
        Rule::record(
            "action-triggers-shape",
            "Each trigger is an Action identifier or { action, condition }",
            Structural,
            ACTION,
            triggers_shape,
        ),
        Rule::record(
            "action-trigger-condition-non-empty",
            "Trigger conditions are not blank",
            BestPractice,
            ACTION,
            blank_conditions,
        ),
        Rule::record(
            "action-expectations-reference",
            "expectations reference Expectation classes",
            Structural,
            ACTION,
            |r, ctx| support::check_reference_field(r, ctx, "expectations", &[AnnotationKind::Expectation]),
        ),
        Rule::record("action-timeout-format", "timeout is a duration string", Structural, ACTION, |r, _| {
            support::check_duration_format(r, "timeout")
        }),
        Rule::record(
            "action-timeout-realistic",
            "timeout is between 100ms and 24h",
            BestPractice,
            ACTION,
            |r, _| support::check_duration_band(r, "timeout", ACTION_TIMEOUT),
        ),
        Rule::record(
            "action-retry-bounds",
            "retry.maxAttempts is 1 to 10 and retry.backoff a duration",
            Structural,
            ACTION,
            retry_bounds,
        ),
        Rule::graph(
            "action-no-trigger-cycles",
            "Action triggers do not form cycles",
            Structural,
            ACTION,
            trigger_cycles,
        ),
        Rule::graph(
            "action-unreachable",
            "Every Action is reachable from a Journey",
            BestPractice,
            &[AnnotationKind::Action, AnnotationKind::Journey],
            unreachable,
        ),
    ]
}

fn triggers_shape(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(entries) = record.fields().list("triggers") else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let problem = match &entry.value {
                FieldValue::Reference(_) => return None,
                FieldValue::Object(map) => match map.value("action") {
                    Some(FieldValue::Reference(_)) => {
                        let extra: Vec<&str> = map.keys().filter(|k| !matches!(*k, "action" | "condition")).collect();
                        if !extra.is_empty() {
                            format!("trigger has unknown keys: {}", extra.join(", "))
                        } else if map.value("condition").is_some_and(|c| c.as_str().is_none()) {
                            "trigger condition must be a string".to_string()
                        } else {
                            return None;
                        }
                    }
                    Some(other) => format!("trigger action must be an Action identifier, found {}", other.type_name()),
                    None => "trigger object is missing 'action'".to_string(),
                },
                other => format!(
                    "trigger must be an Action identifier or {{ action, condition }}, found {}",
                    other.type_name()
                ),
            };
            Some(Diagnostic::on(record, entry.span, "invalidTrigger", problem))
        })
        .collect()
}

fn blank_conditions(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(entries) = record.fields().list("triggers") else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let FieldValue::Object(map) = &entry.value else {
                return None;
            };
            let prop = map.get("condition")?;
            let text = prop.value.value.as_str()?;
            text.trim().is_empty().then(|| {
                Diagnostic::on(
                    record,
                    prop.value.span,
                    "emptyCondition",
                    "trigger condition is empty; remove it or state when the trigger fires",
                )
            })
        })
        .collect()
}

fn retry_bounds(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(retry) = record.fields().object("retry") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    if let Some(prop) = retry.get("maxAttempts") {
        if let Some(n) = prop.value.value.as_number() {
            if n.fract() != 0.0 || !(1.0..=MAX_RETRY_ATTEMPTS).contains(&n) {
                out.push(Diagnostic::on(
                    record,
                    prop.value.span,
                    "invalidMaxAttempts",
                    format!(
                        "retry.maxAttempts must be a whole number from 1 to {}, found {}",
                        support::fmt_number(MAX_RETRY_ATTEMPTS),
                        support::fmt_number(n)
                    ),
                ));
            }
        }
    }
    if let Some(prop) = retry.get("backoff") {
        if let Some(text) = prop.value.value.as_str() {
            if support::parse_duration(text).is_none() {
                out.push(Diagnostic::on(
                    record,
                    prop.value.span,
                    "invalidBackoff",
                    format!("retry.backoff '{text}' is not a duration like '500ms' or '2s'"),
                ));
            }
        }
    }
    out
}

fn trigger_cycles(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let graph = ctx.trigger_graph();
    let mut out = Vec::new();

    for cycle in graph.cycles() {
        let Some(first) = cycle.first() else {
            continue;
        };
        let record = &graph.node(*first).record;
        out.push(Diagnostic::on(
            record,
            record.span(),
            "triggerCycle",
            format!("Action trigger cycle: {}", graph.cycle_label(&cycle)),
        ));
    }

    for problem in graph.problems() {
        match problem {
            TriggerProblem::Dangling {
                source,
                target,
                span,
                reason,
            } => out.extend(support::unresolved(
                source,
                ctx,
                *span,
                format!("Action '{}' triggers '{target}', which cannot be resolved: {reason}", source.owner_name()),
            )),
            TriggerProblem::NotAction {
                source,
                target,
                span,
                kinds,
            } => out.push(Diagnostic::on(
                source,
                *span,
                "triggerNotAction",
                format!(
                    "Action '{}' triggers '{target}', which is annotated as {kinds}, not Action",
                    source.owner_name()
                ),
            )),
        }
    }
    out
}

fn unreachable(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let journeys: Vec<_> = ctx.records().of_kind(AnnotationKind::Journey).collect();
    if journeys.is_empty() {
        return Vec::new();
    }
    let graph = ctx.trigger_graph();

    let mut roots = Vec::new();
    for journey in journeys {
        let listed = journey.fields().list("actions").unwrap_or_default();
        let entry = journey.field("entryAction").map(|p| &p.value);
        for value in listed.iter().chain(entry) {
            let Some(name) = value.value.as_reference() else {
                continue;
            };
            if let ResolvedReference::Annotated(class) = ctx.resolve(name, journey.source_file()).as_ref() {
                if let Some(action) = class.record(AnnotationKind::Action) {
                    roots.extend(graph.node_of(action.source_file(), action.owner_name()));
                }
            }
        }
    }

    let reached = graph.reachable_from(roots);
    graph
        .nodes()
        .filter(|idx| !reached.contains(idx))
        .map(|idx| graph.node(idx))
        .filter(|node| node.in_run && node.record.owner() == OwnerKind::Class)
        .map(|node| {
            Diagnostic::on(
                &node.record,
                node.record.span(),
                "unreachableAction",
                format!(
                    "Action '{}' is not reachable from any Journey's actions or triggers",
                    node.record.owner_name()
                ),
            )
        })
        .collect()
}

//! BusinessInitiative rules
//!
//! - budget: positive, and reconciled with `budgetBreakdown` within 1%
//! - timeline: real `YYYY-MM-DD` dates, end not before start
//! - milestones: inside the timeline, in date order

use crate::finding::Diagnostic;
use crate::fix::TextEdit;
use crate::rule::Category::{BestPractice, Structural};
use crate::rule::{FixContext, Rule, RuleContext};
use crate::schema::STATUSES;
use crate::support::{self, fmt_number};
use bml_model::{AnnotationKind, AnnotationRecord, FieldMap};
use bml_syntax::Span;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

const INITIATIVE: &[AnnotationKind] = &[AnnotationKind::BusinessInitiative];

/// Allowed relative difference between `budget` and the breakdown sum (inclusive)
const BUDGET_TOLERANCE: f64 = 0.01;

static CURRENCY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("currency pattern"));

pub(crate) fn rules() -> Vec<Rule> {
    vec![
        Rule::record(
            "initiative-budget-positive",
            "budget is greater than zero",
            Structural,
            INITIATIVE,
            budget_positive,
        ),
        Rule::record(
            "initiative-budget-reconciliation",
            "budgetBreakdown sums to budget within 1%",
            Structural,
            INITIATIVE,
            budget_reconciliation,
        ),
        Rule::record(
            "initiative-timeline-order",
            "timeline dates are valid and end is not before start",
            Structural,
            INITIATIVE,
            timeline_order,
        ),
        Rule::record(
            "initiative-milestones-within-timeline",
            "Milestone dates fall inside the timeline",
            BestPractice,
            INITIATIVE,
            milestones_within_timeline,
        ),
        Rule::record(
            "initiative-milestones-order",
            "Milestones are listed in date order",
            BestPractice,
            INITIATIVE,
            milestones_order,
        ),
        Rule::record(
            "initiative-owner-reference",
            "owner references a Stakeholder class",
            Structural,
            INITIATIVE,
            |r, ctx| support::check_reference_field(r, ctx, "owner", &[AnnotationKind::Stakeholder]),
        ),
        Rule::record(
            "initiative-strategy-reference",
            "strategy references a Strategy class",
            Structural,
            INITIATIVE,
            |r, ctx| support::check_reference_field(r, ctx, "strategy", &[AnnotationKind::Strategy]),
        ),
        Rule::record(
            "initiative-metrics-reference",
            "metrics reference Metric classes",
            Structural,
            INITIATIVE,
            |r, ctx| support::check_reference_field(r, ctx, "metrics", &[AnnotationKind::Metric]),
        ),
        Rule::record(
            "initiative-valid-status",
            "status is one of the initiative lifecycle states",
            Structural,
            INITIATIVE,
            |r, _| support::check_enum(r, "status", STATUSES),
        )
        .with_fix(fix_status),
        Rule::record(
            "initiative-valid-currency",
            "currency is an uppercase ISO 4217 code",
            Structural,
            INITIATIVE,
            currency,
        )
        .with_fix(fix_currency),
        Rule::record(
            "initiative-require-metrics",
            "Initiative lists the metrics it moves",
            BestPractice,
            INITIATIVE,
            |r, _| support::require_list(r, "metrics", "missingMetrics"),
        ),
    ]
}

fn fix_status(_: &AnnotationRecord, diagnostic: &Diagnostic, ctx: &FixContext<'_>) -> Option<TextEdit> {
    support::case_fix(diagnostic, ctx, STATUSES)
}

fn budget_positive(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(prop) = record.field("budget") else {
        return Vec::new();
    };
    match prop.value.value.as_number() {
        Some(budget) if budget <= 0.0 => vec![Diagnostic::on(
            record,
            prop.value.span,
            "nonPositiveBudget",
            format!("budget must be greater than 0, found {}", fmt_number(budget)),
        )],
        _ => Vec::new(),
    }
}

fn budget_reconciliation(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(budget_prop) = record.field("budget") else {
        return Vec::new();
    };
    let Some(budget) = budget_prop.value.value.as_number() else {
        return Vec::new();
    };

    let Some(breakdown_prop) = record.field("budgetBreakdown") else {
        return vec![Diagnostic::on(
            record,
            budget_prop.span,
            "missingBreakdown",
            format!(
                "budget of {} has no budgetBreakdown to reconcile against",
                fmt_number(budget)
            ),
        )];
    };
    let Some(breakdown) = breakdown_prop.value.value.as_object() else {
        return Vec::new();
    };
    if breakdown.is_empty() {
        return vec![Diagnostic::on(
            record,
            breakdown_prop.value.span,
            "emptyBreakdown",
            "budgetBreakdown is empty",
        )];
    }

    let mut non_numeric = Vec::new();
    let mut sum = 0.0;
    for entry in breakdown.iter() {
        match entry.value.value.as_number() {
            Some(amount) => sum += amount,
            None => non_numeric.push(Diagnostic::on(
                record,
                entry.value.span,
                "nonNumericBreakdownEntry",
                format!(
                    "budgetBreakdown.{} must be a number, found {}",
                    entry.key,
                    entry.value.value.type_name()
                ),
            )),
        }
    }
    if !non_numeric.is_empty() {
        return non_numeric;
    }

    if (sum - budget).abs() <= budget.abs() * BUDGET_TOLERANCE {
        return Vec::new();
    }
    vec![Diagnostic::on(
        record,
        breakdown_prop.value.span,
        "budgetMismatch",
        format!(
            "budgetBreakdown sums to {} but budget is {} (more than 1% apart)",
            fmt_number(sum),
            fmt_number(budget)
        ),
    )]
}

/// A date field that could be read
struct DateValue {
    date: NaiveDate,
    span: Span,
}

/// Parse one string date, reporting a bad format
fn read_date(
    record: &AnnotationRecord,
    map: &FieldMap,
    key: &str,
    path: &str,
    errors: &mut Vec<Diagnostic>,
) -> Option<DateValue> {
    let prop = map.get(key)?;
    // non-string values are reported by `field-type`
    let text = prop.value.value.as_str()?;
    match support::parse_date(text) {
        Some(date) => Some(DateValue {
            date,
            span: prop.value.span,
        }),
        None => {
            errors.push(Diagnostic::on(
                record,
                prop.value.span,
                "invalidDateFormat",
                format!("{path} '{text}' is not a valid YYYY-MM-DD date"),
            ));
            None
        }
    }
}

fn timeline_order(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(timeline) = record.fields().object("timeline") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let start = read_date(record, timeline, "start", "timeline.start", &mut out);
    let end = read_date(record, timeline, "end", "timeline.end", &mut out);
    if !out.is_empty() {
        return out;
    }
    if let (Some(start), Some(end)) = (start, end) {
        if end.date < start.date {
            out.push(Diagnostic::on(
                record,
                end.span,
                "endBeforeStart",
                format!("timeline.end ({}) is before timeline.start ({})", end.date, start.date),
            ));
        }
    }
    out
}

/// Valid timeline bounds, if both dates parse
fn timeline_bounds(record: &AnnotationRecord) -> Option<(NaiveDate, NaiveDate)> {
    let timeline = record.fields().object("timeline")?;
    let start = support::parse_date(timeline.str("start")?)?;
    let end = support::parse_date(timeline.str("end")?)?;
    Some((start, end))
}

/// `(name, date, span)` of every milestone with a valid date
fn milestones(record: &AnnotationRecord) -> Vec<(&str, NaiveDate, Span)> {
    let Some(items) = record.fields().list("milestones") else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let map = item.value.as_object()?;
            let prop = map.get("date")?;
            let date = support::parse_date(prop.value.value.as_str()?)?;
            Some((map.str("name").unwrap_or("milestone"), date, prop.value.span))
        })
        .collect()
}

fn milestones_within_timeline(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some((start, end)) = timeline_bounds(record) else {
        return Vec::new();
    };
    milestones(record)
        .into_iter()
        .filter(|(_, date, _)| *date < start || *date > end)
        .map(|(name, date, span)| {
            Diagnostic::on(
                record,
                span,
                "milestoneOutsideTimeline",
                format!("milestone '{name}' ({date}) is outside the timeline {start}..{end}"),
            )
        })
        .collect()
}

fn milestones_order(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    milestones(record)
        .windows(2)
        .filter(|pair| pair[1].1 < pair[0].1)
        .map(|pair| {
            let (prev, prev_date, _) = pair[0];
            let (name, date, span) = pair[1];
            Diagnostic::on(
                record,
                span,
                "milestonesOutOfOrder",
                format!("milestone '{name}' ({date}) comes before the preceding '{prev}' ({prev_date})"),
            )
        })
        .collect()
}

fn currency(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(prop) = record.field("currency") else {
        return Vec::new();
    };
    let Some(code) = prop.value.value.as_str() else {
        return Vec::new();
    };
    if CURRENCY.is_match(code) {
        return Vec::new();
    }
    let diagnostic = Diagnostic::on(
        record,
        prop.value.span,
        "invalidCurrency",
        format!("currency '{code}' is not a three-letter uppercase code like 'USD'"),
    );
    if CURRENCY.is_match(&code.to_ascii_uppercase()) {
        vec![diagnostic.with_fix()]
    } else {
        vec![diagnostic]
    }
}

fn fix_currency(_: &AnnotationRecord, diagnostic: &Diagnostic, ctx: &FixContext<'_>) -> Option<TextEdit> {
    let inner = support::string_contents_range(ctx, diagnostic.span.range)?;
    let upper = ctx.slice(inner)?.to_ascii_uppercase();
    CURRENCY
        .is_match(&upper)
        .then(|| TextEdit::replace(inner, upper))
}

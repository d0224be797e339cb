//! Helpers shared by rule modules
//!
//! Most rules are one of a handful of shapes: a required field, an enumerated
//! string, a reference that must land on a given kind, a duration inside a
//! band. The shapes live here so each rule module stays a list of small
//! checks.

use crate::finding::Diagnostic;
use crate::fix::TextEdit;
use crate::rule::{FixContext, RuleContext, UnresolvedPolicy};
use crate::severity::Severity;
use bml_model::{AnnotationKind, AnnotationRecord, FieldMap, FieldValue, Spanned};
use bml_resolve::ResolvedReference;
use bml_syntax::{Span, TextRange};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)(ms|s|m|h|d|w)$").expect("duration pattern"));

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern"));

// milliseconds per unit
const SECOND: f64 = 1_000.0;
const MINUTE: f64 = 60.0 * SECOND;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const WEEK: f64 = 7.0 * DAY;

/// Parse a duration string (`250ms`, `1.5h`, `3d`) into milliseconds
#[must_use]
pub fn parse_duration(text: &str) -> Option<f64> {
    let caps = DURATION.captures(text)?;
    let amount: f64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = match caps.get(2)?.as_str() {
        "ms" => 1.0,
        "s" => SECOND,
        "m" => MINUTE,
        "h" => HOUR,
        "d" => DAY,
        "w" => WEEK,
        _ => return None,
    };
    Some(amount * unit)
}

/// Inclusive realism band for durations, in milliseconds
#[derive(Debug, Clone, Copy)]
pub struct DurationBand {
    /// Lower bound (ms)
    pub min_ms: f64,
    /// Upper bound (ms)
    pub max_ms: f64,
    /// Lower bound as written in messages
    pub min_label: &'static str,
    /// Upper bound as written in messages
    pub max_label: &'static str,
}

/// Action timeouts
pub const ACTION_TIMEOUT: DurationBand = DurationBand {
    min_ms: 100.0,
    max_ms: DAY,
    min_label: "100ms",
    max_label: "24h",
};

/// Journey durations
pub const JOURNEY_DURATION: DurationBand = DurationBand {
    min_ms: SECOND,
    max_ms: 90.0 * DAY,
    min_label: "1s",
    max_label: "90d",
};

/// Witness timeouts
pub const WITNESS_TIMEOUT: DurationBand = DurationBand {
    min_ms: SECOND,
    max_ms: HOUR,
    min_label: "1s",
    max_label: "1h",
};

/// Upper bound for latency values (ms)
pub const MAX_LATENCY_MS: f64 = 60_000.0;

/// Parse a strict `YYYY-MM-DD` calendar date
#[must_use]
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    if !ISO_DATE.is_match(text) {
        return None;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Format a number for messages: integers without a fractional part
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn fmt_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// `Stakeholder or Persona`
#[must_use]
pub fn kinds_label(kinds: &[AnnotationKind]) -> String {
    let names: Vec<&str> = kinds.iter().map(AnnotationKind::name).collect();
    match names.split_last() {
        None => String::new(),
        Some((last, [])) => (*last).to_string(),
        Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
    }
}

/// Report a missing or blank string field
pub fn require_text(record: &AnnotationRecord, key: &str, message_id: &'static str) -> Vec<Diagnostic> {
    match record.field(key) {
        None => vec![Diagnostic::on(
            record,
            record.span(),
            message_id,
            format!("{} '{}' is missing '{key}'", record.kind(), record.owner_name()),
        )],
        Some(prop) => match prop.value.value.as_str() {
            Some(text) if text.trim().is_empty() => vec![Diagnostic::on(
                record,
                prop.value.span,
                message_id,
                format!("{} '{}' has an empty '{key}'", record.kind(), record.owner_name()),
            )],
            _ => Vec::new(),
        },
    }
}

/// Report a missing or empty list field
pub fn require_list(record: &AnnotationRecord, key: &str, message_id: &'static str) -> Vec<Diagnostic> {
    match record.field(key) {
        None => vec![Diagnostic::on(
            record,
            record.span(),
            message_id,
            format!("{} '{}' is missing '{key}'", record.kind(), record.owner_name()),
        )],
        Some(prop) => match prop.value.value.as_list() {
            Some([]) => vec![Diagnostic::on(
                record,
                prop.value.span,
                message_id,
                format!("{} '{}' has an empty '{key}' list", record.kind(), record.owner_name()),
            )],
            _ => Vec::new(),
        },
    }
}

/// Report a string field whose value is not one of `allowed`
///
/// The diagnostic is fixable when the value matches an allowed one ignoring
/// case; pair with [`case_fix`].
pub fn check_enum(record: &AnnotationRecord, key: &str, allowed: &[&str]) -> Vec<Diagnostic> {
    let Some(prop) = record.field(key) else {
        return Vec::new();
    };
    let Some(value) = prop.value.value.as_str() else {
        return Vec::new();
    };
    if allowed.contains(&value) {
        return Vec::new();
    }

    let diagnostic = Diagnostic::on(
        record,
        prop.value.span,
        "invalidValue",
        format!(
            "{} '{}' has invalid {key} '{value}' (expected one of: {})",
            record.kind(),
            record.owner_name(),
            allowed.join(", ")
        ),
    );
    if case_match(value, allowed).is_some() {
        vec![diagnostic.with_fix()]
    } else {
        vec![diagnostic]
    }
}

fn case_match<'a>(value: &str, allowed: &[&'a str]) -> Option<&'a str> {
    allowed
        .iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(value))
}

/// Range inside the quotes of a string literal span
#[must_use]
pub fn string_contents_range(ctx: &FixContext<'_>, literal: TextRange) -> Option<TextRange> {
    let text = ctx.slice(literal)?;
    let quote = text.chars().next()?;
    if !matches!(quote, '\'' | '"' | '`') || text.len() < 2 || !text.ends_with(quote) {
        return None;
    }
    Some(TextRange::new(literal.start + 1, literal.end - 1))
}

/// Replace a string literal's contents, keeping its quotes
#[must_use]
pub fn replace_string_contents(
    ctx: &FixContext<'_>,
    literal: TextRange,
    replacement: &str,
) -> Option<TextEdit> {
    string_contents_range(ctx, literal).map(|inner| TextEdit::replace(inner, replacement))
}

/// Fix for [`check_enum`] diagnostics: rewrite to the allowed spelling
#[must_use]
pub fn case_fix(diagnostic: &Diagnostic, ctx: &FixContext<'_>, allowed: &[&str]) -> Option<TextEdit> {
    let inner = string_contents_range(ctx, diagnostic.span.range)?;
    let current = ctx.slice(inner)?;
    let canonical = case_match(current, allowed)?;
    Some(TextEdit::replace(inner, canonical))
}

/// Check one reference value against the expected kinds
///
/// Non-reference values are left to `field-type` and
/// `prefer-reference-over-string`.
pub fn check_reference(
    record: &AnnotationRecord,
    ctx: &RuleContext<'_>,
    key: &str,
    value: &Spanned<FieldValue>,
    expected: &[AnnotationKind],
) -> Option<Diagnostic> {
    let name = value.value.as_reference()?;
    let resolved = ctx.resolve(name, record.source_file());
    match resolved.as_ref() {
        ResolvedReference::Annotated(class) => {
            if expected.iter().any(|kind| class.has_kind(*kind)) {
                return None;
            }
            Some(Diagnostic::on(
                record,
                value.span,
                "wrongKind",
                format!(
                    "{key} '{name}' must reference a {} class, but '{}' is annotated as {}",
                    kinds_label(expected),
                    class.name(),
                    class.kinds_label()
                ),
            ))
        }
        ResolvedReference::Unresolved(reason) => {
            unresolved(record, ctx, value.span, format!("{key} '{name}' cannot be resolved: {reason}"))
        }
    }
}

/// Diagnostic for an unresolved reference under the rule's policy
pub fn unresolved(
    record: &AnnotationRecord,
    ctx: &RuleContext<'_>,
    span: Span,
    message: String,
) -> Option<Diagnostic> {
    let diagnostic = Diagnostic::on(record, span, "unresolvedReference", message);
    match ctx.rule().on_unresolved {
        UnresolvedPolicy::Ignore => None,
        UnresolvedPolicy::Warn => Some(diagnostic.at_most(Severity::Warn)),
        UnresolvedPolicy::Error => Some(diagnostic),
    }
}

/// Check a single or list reference field
pub fn check_reference_field(
    record: &AnnotationRecord,
    ctx: &RuleContext<'_>,
    key: &str,
    expected: &[AnnotationKind],
) -> Vec<Diagnostic> {
    let Some(prop) = record.field(key) else {
        return Vec::new();
    };
    match &prop.value.value {
        FieldValue::List(items) => items
            .iter()
            .filter_map(|item| check_reference(record, ctx, key, item, expected))
            .collect(),
        _ => check_reference(record, ctx, key, &prop.value, expected)
            .into_iter()
            .collect(),
    }
}

/// Report the first out-of-order consecutive pair among numeric keys of a
/// nested object; `ascending` requires non-decreasing values
pub fn check_order(
    record: &AnnotationRecord,
    object_key: &str,
    keys: &[&str],
    ascending: bool,
    message_id: &'static str,
) -> Vec<Diagnostic> {
    let Some(prop) = record.field(object_key) else {
        return Vec::new();
    };
    let Some(map) = prop.value.value.as_object() else {
        return Vec::new();
    };

    let present: Vec<(&str, f64, Span)> = keys
        .iter()
        .filter_map(|key| {
            let p = map.get(key)?;
            Some((*key, p.value.value.as_number()?, p.value.span))
        })
        .collect();

    let relation = if ascending { "<=" } else { ">=" };
    present
        .windows(2)
        .filter_map(|pair| {
            let (lo_key, lo, _) = pair[0];
            let (hi_key, hi, span) = pair[1];
            let ordered = if ascending { lo <= hi } else { lo >= hi };
            (!ordered).then(|| {
                Diagnostic::on(
                    record,
                    span,
                    message_id,
                    format!(
                        "{object_key}.{lo_key} ({}) must be {relation} {object_key}.{hi_key} ({})",
                        fmt_number(lo),
                        fmt_number(hi)
                    ),
                )
            })
        })
        .collect()
}

/// Duration field format check
pub fn check_duration_format(record: &AnnotationRecord, key: &str) -> Vec<Diagnostic> {
    let Some(prop) = record.field(key) else {
        return Vec::new();
    };
    let Some(text) = prop.value.value.as_str() else {
        return Vec::new();
    };
    if parse_duration(text).is_some() {
        return Vec::new();
    }
    vec![Diagnostic::on(
        record,
        prop.value.span,
        "invalidDuration",
        format!("{key} '{text}' is not a duration like '500ms', '30s', '2h' or '3d'"),
    )]
}

/// Duration field realism check; unparsable values are left to the format rule
pub fn check_duration_band(record: &AnnotationRecord, key: &str, band: DurationBand) -> Vec<Diagnostic> {
    let Some(prop) = record.field(key) else {
        return Vec::new();
    };
    let Some(ms) = prop.value.value.as_str().and_then(parse_duration) else {
        return Vec::new();
    };
    if (band.min_ms..=band.max_ms).contains(&ms) {
        return Vec::new();
    }
    vec![Diagnostic::on(
        record,
        prop.value.span,
        "unrealisticDuration",
        format!(
            "{key} of {} is outside the realistic range {}..{}",
            prop.value.value.as_str().unwrap_or_default(),
            band.min_label,
            band.max_label
        ),
    )]
}

/// Latency values outside `(0, 60000]` ms
pub fn check_latency_band(record: &AnnotationRecord, key: &str) -> Vec<Diagnostic> {
    let Some(map) = record.fields().object(key) else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|prop| {
            let value = prop.value.value.as_number()?;
            (value <= 0.0 || value > MAX_LATENCY_MS).then(|| {
                Diagnostic::on(
                    record,
                    prop.value.span,
                    "unrealisticLatency",
                    format!(
                        "{key}.{} of {}ms is outside the realistic range (0, {}] ms",
                        prop.key,
                        fmt_number(value),
                        fmt_number(MAX_LATENCY_MS)
                    ),
                )
            })
        })
        .collect()
}

/// Visit every value in a field map, depth first, with the top-level key
pub fn visit_values<'a>(map: &'a FieldMap, visit: &mut impl FnMut(&'a Spanned<FieldValue>)) {
    for prop in map.iter() {
        visit_value(&prop.value, visit);
    }
}

fn visit_value<'a>(value: &'a Spanned<FieldValue>, visit: &mut impl FnMut(&'a Spanned<FieldValue>)) {
    visit(value);
    match &value.value {
        FieldValue::List(items) => {
            for item in items {
                visit_value(item, visit);
            }
        }
        FieldValue::Object(map) => visit_values(map, visit),
        _ => {}
    }
}

/// Visit every value under one top-level property, including the property value itself
pub fn visit_property<'a>(value: &'a Spanned<FieldValue>, visit: &mut impl FnMut(&'a Spanned<FieldValue>)) {
    visit_value(value, visit);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(parse_duration("250ms"), Some(250.0));
        assert_eq!(parse_duration("1.5h"), Some(5_400_000.0));
        assert_eq!(parse_duration("2w"), Some(2.0 * WEEK));
        assert_eq!(parse_duration("5 min"), None);
        assert_eq!(parse_duration("h"), None);
        assert_eq!(parse_duration("-1s"), None);
    }

    #[test]
    fn dates_must_be_strict_and_real() {
        assert!(parse_date("2024-02-29").is_some());
        assert!(parse_date("2023-02-29").is_none());
        assert!(parse_date("2024-1-01").is_none());
        assert!(parse_date("bad-date").is_none());
        assert!(parse_date("2024-01-01T00:00").is_none());
    }

    #[test]
    fn number_formatting() {
        assert_eq!(fmt_number(500_000.0), "500000");
        assert_eq!(fmt_number(99.5), "99.5");
        assert_eq!(fmt_number(-3.0), "-3");
    }

    #[test]
    fn kind_labels() {
        assert_eq!(kinds_label(&[AnnotationKind::Metric]), "Metric");
        assert_eq!(
            kinds_label(&[AnnotationKind::Stakeholder, AnnotationKind::Persona]),
            "Stakeholder or Persona"
        );
    }

    #[test]
    fn string_contents_keep_quotes() {
        let text = r#"{ kind: "E2E" }"#;
        let ctx = FixContext { text };
        let start = text.find('"').unwrap();
        let edit = replace_string_contents(&ctx, TextRange::new(start, start + 5), "e2e").unwrap();
        assert_eq!(edit.range, TextRange::new(start + 1, start + 4));
        assert!(replace_string_contents(&ctx, TextRange::new(0, 1), "x").is_none());
    }
}

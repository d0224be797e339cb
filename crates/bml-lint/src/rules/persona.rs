//! Persona rules

use crate::finding::Diagnostic;
use crate::fix::TextEdit;
use crate::rule::Category::{BestPractice, Structural};
use crate::rule::{FixContext, Rule, RuleContext};
use crate::schema::LEVELS;
use crate::support::{self, fmt_number};
use bml_model::{AnnotationKind, AnnotationRecord};

const PERSONA: &[AnnotationKind] = &[AnnotationKind::Persona];

pub(crate) fn rules() -> Vec<Rule> {
    vec![
        Rule::record("persona-require-goals", "Persona lists its goals", Structural, PERSONA, |r, _| {
            support::require_list(r, "goals", "missingGoals")
        }),
        Rule::record(
            "persona-require-pain-points",
            "Persona lists its pain points",
            BestPractice,
            PERSONA,
            |r, _| support::require_list(r, "painPoints", "missingPainPoints"),
        ),
        Rule::record(
            "persona-valid-tech-savviness",
            "techSavviness is low, medium or high",
            Structural,
            PERSONA,
            |r, _| support::check_enum(r, "techSavviness", LEVELS),
        )
        .with_fix(fix_level),
        Rule::record(
            "persona-age-range-order",
            "ageRange.min is not above ageRange.max, and both are non-negative",
            Structural,
            PERSONA,
            age_range,
        ),
    ]
}

fn fix_level(_: &AnnotationRecord, diagnostic: &Diagnostic, ctx: &FixContext<'_>) -> Option<TextEdit> {
    support::case_fix(diagnostic, ctx, LEVELS)
}

fn age_range(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let Some(range) = record.fields().object("ageRange") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for bound in ["min", "max"] {
        if let Some(prop) = range.get(bound) {
            if prop.value.value.as_number().is_some_and(|n| n < 0.0) {
                out.push(Diagnostic::on(
                    record,
                    prop.value.span,
                    "negativeAge",
                    format!("ageRange.{bound} cannot be negative"),
                ));
            }
        }
    }
    if let (Some(min), Some(max)) = (range.number("min"), range.number("max")) {
        if min > max {
            let span = range.get("max").map_or(record.span(), |p| p.value.span);
            out.push(Diagnostic::on(
                record,
                span,
                "invalidAgeRange",
                format!(
                    "ageRange.min ({}) must be <= ageRange.max ({})",
                    fmt_number(min),
                    fmt_number(max)
                ),
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::rules::test_support::{fixed, lint, messages};
    use pretty_assertions::assert_eq;

    fn persona(fields: &str) -> String {
        format!("@Persona({{ name: 'Buyer', {fields} }}) class Buyer {{}}")
    }

    #[test]
    fn goals_and_pain_points_are_required() {
        let report = lint(&persona("painPoints: []"));
        assert_eq!(messages(&report, "persona-require-goals"), vec!["missingGoals"]);
        assert_eq!(messages(&report, "persona-require-pain-points"), vec!["missingPainPoints"]);

        let report = lint(&persona("goals: ['Pay fast'], painPoints: ['Slow checkout']"));
        assert!(messages(&report, "persona-require-goals").is_empty());
        assert!(messages(&report, "persona-require-pain-points").is_empty());
    }

    #[test]
    fn tech_savviness_case_is_fixed() {
        let source = persona("goals: ['g'], painPoints: ['p'], techSavviness: 'HIGH'");
        assert_eq!(messages(&lint(&source), "persona-valid-tech-savviness"), vec!["invalidValue"]);
        assert!(fixed(&source).contains("techSavviness: 'high'"));

        let report = lint(&persona("goals: ['g'], painPoints: ['p'], techSavviness: 'expert'"));
        assert!(report.findings_for("persona-valid-tech-savviness").all(|f| f.fix.is_none()));
        let report = lint(&persona("goals: ['g'], painPoints: ['p'], techSavviness: 'low'"));
        assert!(messages(&report, "persona-valid-tech-savviness").is_empty());
    }

    #[test]
    fn age_range_bounds() {
        let report = lint(&persona("goals: ['g'], painPoints: ['p'], ageRange: { min: 40, max: 30 }"));
        let found: Vec<_> = report.findings_for("persona-age-range-order").collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message_id, "invalidAgeRange");
        assert_eq!(found[0].message, "ageRange.min (40) must be <= ageRange.max (30)");

        let report = lint(&persona("goals: ['g'], painPoints: ['p'], ageRange: { min: -1, max: 30 }"));
        assert_eq!(messages(&report, "persona-age-range-order"), vec!["negativeAge"]);

        let report = lint(&persona("goals: ['g'], painPoints: ['p'], ageRange: { min: 18, max: 65 }"));
        assert!(messages(&report, "persona-age-range-order").is_empty());
    }
}

//! Context rules

use crate::rule::Category::Structural;
use crate::rule::Rule;
use crate::support;
use bml_model::AnnotationKind;

const CONTEXT: &[AnnotationKind] = &[AnnotationKind::Context];

pub(crate) fn rules() -> Vec<Rule> {
    vec![
        Rule::record("context-require-domain", "Context names its domain", Structural, CONTEXT, |r, _| {
            support::require_text(r, "domain", "missingDomain")
        }),
        Rule::record(
            "context-owner-reference",
            "owner references a Stakeholder class",
            Structural,
            CONTEXT,
            |r, ctx| support::check_reference_field(r, ctx, "owner", &[AnnotationKind::Stakeholder]),
        ),
        Rule::record(
            "context-strategy-reference",
            "strategy references a Strategy class",
            Structural,
            CONTEXT,
            |r, ctx| support::check_reference_field(r, ctx, "strategy", &[AnnotationKind::Strategy]),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use crate::rules::test_support::{lint, messages};
    use pretty_assertions::assert_eq;

    fn context(fields: &str) -> String {
        format!(
            "@Stakeholder({{ name: 'Ops', role: 'r' }}) class Ops {{}}\n\
             @Persona({{ name: 'Buyer', goals: ['g'], painPoints: ['p'] }}) class Buyer {{}}\n\
             @Strategy({{ name: 'Grow', vision: 'v', objectives: ['o'] }}) class Grow {{}}\n\
             @Context({{ name: 'Sales', {fields} }}) class Sales {{}}"
        )
    }

    #[test]
    fn domain_is_required() {
        let report = lint(&context("owner: Ops"));
        assert_eq!(messages(&report, "context-require-domain"), vec!["missingDomain"]);
        let report = lint(&context("domain: 'commerce'"));
        assert!(messages(&report, "context-require-domain").is_empty());
    }

    #[test]
    fn owner_is_a_stakeholder() {
        let report = lint(&context("domain: 'd', owner: Buyer"));
        let found: Vec<_> = report.findings_for("context-owner-reference").collect();
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].message,
            "owner 'Buyer' must reference a Stakeholder class, but 'Buyer' is annotated as Persona"
        );
        let report = lint(&context("domain: 'd', owner: Ops"));
        assert!(messages(&report, "context-owner-reference").is_empty());
    }

    #[test]
    fn strategy_is_a_strategy() {
        let report = lint(&context("domain: 'd', strategy: Ghost"));
        assert_eq!(messages(&report, "context-strategy-reference"), vec!["unresolvedReference"]);
        let report = lint(&context("domain: 'd', strategy: Grow"));
        assert!(messages(&report, "context-strategy-reference").is_empty());
    }
}

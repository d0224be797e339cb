//! Behavior rules

use crate::finding::Diagnostic;
use crate::rule::Category::{BestPractice, Structural};
use crate::rule::{Rule, RuleContext};
use crate::support;
use bml_model::{AnnotationKind, AnnotationRecord, OwnerKind};
use bml_resolve::ResolvedReference;
use std::collections::HashSet;

const BEHAVIOR: &[AnnotationKind] = &[AnnotationKind::Behavior];

pub(crate) fn rules() -> Vec<Rule> {
    vec![
        Rule::record(
            "behavior-expectation-reference",
            "expectation references an Expectation class",
            Structural,
            BEHAVIOR,
            |r, ctx| support::check_reference_field(r, ctx, "expectation", &[AnnotationKind::Expectation]),
        ),
        Rule::record(
            "behavior-require-given-when-then",
            "Behavior states given, when and then",
            Structural,
            BEHAVIOR,
            given_when_then,
        ),
        Rule::graph(
            "behavior-witnessed",
            "Every Behavior has a Witness",
            BestPractice,
            BEHAVIOR,
            witnessed,
        ),
    ]
}

fn given_when_then(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    ["given", "when", "then"]
        .into_iter()
        .flat_map(|clause| support::require_text(record, clause, "missingClause"))
        .collect()
}

fn witnessed(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut witnessed = HashSet::new();
    for witness in ctx.records().of_kind(AnnotationKind::Witness) {
        let Some(name) = witness.value("behavior").and_then(|v| v.as_reference()) else {
            continue;
        };
        if let ResolvedReference::Annotated(class) = ctx.resolve(name, witness.source_file()).as_ref() {
            witnessed.insert((class.file().clone(), class.name().to_string()));
        }
    }

    ctx.records()
        .of_kind(AnnotationKind::Behavior)
        .filter(|r| r.owner() == OwnerKind::Class)
        .filter(|r| !witnessed.contains(&(r.source_file().clone(), r.class_name().to_string())))
        .map(|r| {
            Diagnostic::on(
                r,
                r.span(),
                "unwitnessedBehavior",
                format!("Behavior '{}' has no Witness", r.owner_name()),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::rules::test_support::{lint, messages};
    use pretty_assertions::assert_eq;

    const FAST: &str = "@Expectation({ name: 'Fast', criteria: ['c'] }) class Fast {}\n\
                        @Stakeholder({ name: 'Ops', role: 'r' }) class Ops {}\n";

    #[test]
    fn expectation_reference() {
        let report = lint(&format!(
            "{FAST}@Behavior({{ name: 'PaysOnce', expectation: Ops, given: 'g', when: 'w', then: 't' }}) class PaysOnce {{}}"
        ));
        assert_eq!(messages(&report, "behavior-expectation-reference"), vec!["wrongKind"]);
        let report = lint(&format!(
            "{FAST}@Behavior({{ name: 'PaysOnce', expectation: Fast, given: 'g', when: 'w', then: 't' }}) class PaysOnce {{}}"
        ));
        assert!(messages(&report, "behavior-expectation-reference").is_empty());
    }

    #[test]
    fn clauses_are_required() {
        let report = lint("@Behavior({ name: 'PaysOnce', given: 'a cart', then: '' }) class PaysOnce {}");
        let found: Vec<_> = report.findings_for("behavior-require-given-when-then").collect();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|f| f.message_id == "missingClause"));
        assert!(found.iter().any(|f| f.message.contains("missing 'when'")));
        assert!(found.iter().any(|f| f.message.contains("empty 'then'")));

        let report = lint("@Behavior({ name: 'PaysOnce', given: 'a cart', when: 'paying', then: 'charged once' }) class PaysOnce {}");
        assert!(messages(&report, "behavior-require-given-when-then").is_empty());
    }

    #[test]
    fn behaviors_need_a_witness() {
        let report = lint(
            "@Behavior({ name: 'PaysOnce', given: 'g', when: 'w', then: 't' }) class PaysOnce {}\n\
             @Behavior({ name: 'Refunds', given: 'g', when: 'w', then: 't' }) class Refunds {}\n\
             @Witness({ name: 'PayTest', behavior: PaysOnce, kind: 'e2e', evidence: 'ci' }) class PayTest {}",
        );
        let found: Vec<_> = report.findings_for("behavior-witnessed").collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "Behavior 'Refunds' has no Witness");
    }
}

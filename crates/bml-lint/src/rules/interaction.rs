//! Interaction rules

use super::expectation::PERCENTILES;
use super::journey::participant_name;
use crate::finding::Diagnostic;
use crate::fix::TextEdit;
use crate::rule::Category::Structural;
use crate::rule::{FixContext, Rule, RuleContext};
use crate::schema::{CHANNELS, PEOPLE};
use crate::support;
use bml_model::{AnnotationKind, AnnotationRecord};

const INTERACTION: &[AnnotationKind] = &[AnnotationKind::Interaction];

pub(crate) fn rules() -> Vec<Rule> {
    vec![
        Rule::record(
            "interaction-from-reference",
            "from references a Stakeholder or Persona class",
            Structural,
            INTERACTION,
            |r, ctx| support::check_reference_field(r, ctx, "from", PEOPLE),
        ),
        Rule::record(
            "interaction-to-reference",
            "to references a Stakeholder or Persona class",
            Structural,
            INTERACTION,
            |r, ctx| support::check_reference_field(r, ctx, "to", PEOPLE),
        ),
        Rule::record(
            "interaction-no-self-interaction",
            "from and to name different parties",
            Structural,
            INTERACTION,
            self_interaction,
        ),
        Rule::record(
            "interaction-action-reference",
            "action references an Action class",
            Structural,
            INTERACTION,
            |r, ctx| support::check_reference_field(r, ctx, "action", &[AnnotationKind::Action]),
        ),
        Rule::record(
            "interaction-valid-channel",
            "channel is one of the known channels",
            Structural,
            INTERACTION,
            |r, _| support::check_enum(r, "channel", CHANNELS),
        )
        .with_fix(fix_channel),
        Rule::record(
            "interaction-latency-percentile-order",
            "Latency percentiles are non-decreasing",
            Structural,
            INTERACTION,
            |r, _| support::check_order(r, "latency", PERCENTILES, true, "percentileOrder"),
        ),
    ]
}

fn fix_channel(_: &AnnotationRecord, diagnostic: &Diagnostic, ctx: &FixContext<'_>) -> Option<TextEdit> {
    support::case_fix(diagnostic, ctx, CHANNELS)
}

fn self_interaction(record: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    let (Some(from), Some(to)) = (record.field("from"), record.field("to")) else {
        return Vec::new();
    };
    match (participant_name(&from.value.value), participant_name(&to.value.value)) {
        (Some(a), Some(b)) if a == b => vec![Diagnostic::on(
            record,
            to.value.span,
            "selfInteraction",
            format!("Interaction '{}' goes from '{a}' to itself", record.owner_name()),
        )],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use crate::rules::test_support::{fixed, lint, messages};
    use pretty_assertions::assert_eq;

    fn interaction(fields: &str) -> String {
        format!(
            "@Persona({{ name: 'Buyer', goals: ['g'], painPoints: ['p'] }}) class Buyer {{}}\n\
             @Stakeholder({{ name: 'Ops', role: 'r' }}) class Ops {{}}\n\
             @Action({{ name: 'Checkout' }}) class Checkout {{}}\n\
             @Interaction({{ name: 'Ask', {fields} }}) class Ask {{}}"
        )
    }

    #[test]
    fn parties_are_people() {
        let report = lint(&interaction("from: Checkout, to: Ghost"));
        assert_eq!(messages(&report, "interaction-from-reference"), vec!["wrongKind"]);
        assert_eq!(messages(&report, "interaction-to-reference"), vec!["unresolvedReference"]);

        let report = lint(&interaction("from: Buyer, to: Ops"));
        assert!(messages(&report, "interaction-from-reference").is_empty());
        assert!(messages(&report, "interaction-to-reference").is_empty());
        assert!(messages(&report, "interaction-no-self-interaction").is_empty());
    }

    #[test]
    fn self_interaction() {
        let report = lint(&interaction("from: Ops, to: Ops"));
        let found: Vec<_> = report.findings_for("interaction-no-self-interaction").collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "Interaction 'Ask' goes from 'Ops' to itself");

        let report = lint(&interaction("from: 'Ops', to: Ops"));
        assert_eq!(messages(&report, "interaction-no-self-interaction"), vec!["selfInteraction"]);
    }

    #[test]
    fn action_reference() {
        let report = lint(&interaction("from: Buyer, to: Ops, action: Ops"));
        assert_eq!(messages(&report, "interaction-action-reference"), vec!["wrongKind"]);
        let report = lint(&interaction("from: Buyer, to: Ops, action: Checkout"));
        assert!(messages(&report, "interaction-action-reference").is_empty());
    }

    #[test]
    fn channel_case_is_fixed() {
        let source = interaction("from: Buyer, to: Ops, channel: 'Email'");
        assert_eq!(messages(&lint(&source), "interaction-valid-channel"), vec!["invalidValue"]);
        assert!(fixed(&source).contains("channel: 'email'"));

        let report = lint(&interaction("from: Buyer, to: Ops, channel: 'fax'"));
        assert!(report.findings_for("interaction-valid-channel").all(|f| f.fix.is_none()));
        assert_eq!(messages(&report, "interaction-valid-channel"), vec!["invalidValue"]);

        let report = lint(&interaction("from: Buyer, to: Ops, channel: 'in-person'"));
        assert!(messages(&report, "interaction-valid-channel").is_empty());
    }

    #[test]
    fn latency_percentiles() {
        let report = lint(&interaction("from: Buyer, to: Ops, latency: { p99: 800, max: 500 }"));
        assert_eq!(messages(&report, "interaction-latency-percentile-order"), vec!["percentileOrder"]);
        let report = lint(&interaction("from: Buyer, to: Ops, latency: { p50: 100, max: 500 }"));
        assert!(messages(&report, "interaction-latency-percentile-order").is_empty());
    }
}

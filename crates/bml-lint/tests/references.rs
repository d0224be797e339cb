//! Cross-file reference rules

use bml_test_utils::{analyze, findings, message_ids};
use pretty_assertions::assert_eq;

const PEOPLE: &str = "@Stakeholder({ name: 'Ops', role: 'operations' })\nexport class Ops {}\n\
                      @Metric({ name: 'Conversion', unit: '%' })\nexport class Conversion {}\n";

#[test]
fn imported_stakeholder_resolves() {
    let journey = "import { Ops } from './people';\n\
                   @Journey({ name: 'Onboard', primaryStakeholder: Ops, outcomes: ['live'] })\n\
                   export class Onboard {}\n";
    let report = analyze(&[("people.ts", PEOPLE), ("journey.ts", journey)]);
    assert!(findings(&report, "journey-primary-stakeholder-reference").is_empty());
    assert!(findings(&report, "journey-require-primary-stakeholder").is_empty());
}

#[test]
fn reference_to_wrong_kind() {
    let journey = "import { Conversion } from './people';\n\
                   @Journey({ name: 'Onboard', primaryStakeholder: Conversion, outcomes: ['live'] })\n\
                   export class Onboard {}\n";
    let report = analyze(&[("people.ts", PEOPLE), ("journey.ts", journey)]);
    let found = findings(&report, "journey-primary-stakeholder-reference");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message_id, "wrongKind");
    assert_eq!(
        found[0].message,
        "primaryStakeholder 'Conversion' must reference a Stakeholder or Persona class, but 'Conversion' is annotated as Metric"
    );
}

#[test]
fn missing_module_is_unresolved() {
    let journey = "import { Ops } from './nowhere';\n\
                   @Journey({ name: 'Onboard', primaryStakeholder: Ops, outcomes: ['live'] })\n\
                   export class Onboard {}\n";
    let report = analyze(&[("journey.ts", journey)]);
    assert_eq!(
        message_ids(&report, "journey-primary-stakeholder-reference"),
        vec!["unresolvedReference"]
    );
}

#[test]
fn identifiers_in_free_fields_are_checked_leniently() {
    let text = "@Persona({ name: 'P', goals: ['g'], quote: Somewhere }) class P {}";
    let report = analyze(&[("p.ts", text)]);
    let found = findings(&report, "no-unresolved-references");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, bml_lint::Severity::Warn);
}

//! Fixes attached by the analyzer

use bml_lint::apply_fixes;
use bml_syntax::FileId;
use bml_test_utils::analyze_strict;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn fixed(text: &str) -> String {
    let report = analyze_strict(&[("model.ts", text)]);
    let outcome = apply_fixes(text, report.fixes_for(&FileId::new("model.ts")));
    assert!(outcome.deferred.is_empty());
    outcome.text
}

#[test]
fn enum_case_fix_keeps_quotes() {
    let text = r#"@Persona({ name: 'P', goals: ['g'], techSavviness: "HIGH" }) class P {}"#;
    assert_eq!(
        fixed(text),
        r#"@Persona({ name: 'P', goals: ['g'], techSavviness: "high" }) class P {}"#
    );
}

#[test]
fn unknown_values_get_no_fix() {
    let text = "@Witness({ name: 'W', kind: 'smoke' }) class W {}";
    let report = analyze_strict(&[("model.ts", text)]);
    let finding = report.findings_for("witness-valid-kind").next().unwrap();
    assert!(!finding.fix_offered);
    assert!(finding.fix.is_none());
}

#[test]
fn currency_is_uppercased() {
    let text = "@BusinessInitiative({ name: 'I', currency: 'eur' }) class I {}";
    assert_eq!(fixed(text), "@BusinessInitiative({ name: 'I', currency: 'EUR' }) class I {}");
}

#[test]
fn duplicate_participants_are_removed() {
    let text = "@Persona({ name: 'A', goals: ['g'] }) class A {}\n\
                @Persona({ name: 'B', goals: ['g'] }) class B {}\n\
                @Collaboration({ name: 'C', purpose: 'p', participants: [A, B, A] }) class C {}";
    assert!(fixed(text).ends_with("participants: [A, B] }) class C {}"));
}

#[test]
fn unknown_property_is_removed_with_its_line() {
    let text = "@Metric({\n  name: 'M',\n  colour: 'red',\n  unit: 'ms',\n})\nclass M {}";
    assert_eq!(fixed(text), "@Metric({\n  name: 'M',\n  unit: 'ms',\n})\nclass M {}");
}

fn persona(idx: usize, level: &str, extra: bool, dupes: usize) -> String {
    let extra = if extra { ", nickname: 'x'" } else { "" };
    let goals = vec!["'g'"; dupes.max(1)].join(", ");
    format!("@Persona({{ name: 'P{idx}', goals: [{goals}], techSavviness: '{level}'{extra} }})\nclass P{idx} {{}}\n")
}

proptest! {
    #[test]
    fn offered_fixes_never_overlap(
        personas in prop::collection::vec(
            (prop::sample::select(vec!["low", "LOW", "Medium", "hIgH", "extreme"]), any::<bool>(), 0usize..3),
            1..6,
        ),
        participants in prop::collection::vec(0usize..3, 0..7),
    ) {
        let mut text: String = personas
            .iter()
            .enumerate()
            .map(|(idx, (level, extra, dupes))| persona(idx, level, *extra, *dupes))
            .collect();
        let names: Vec<String> = participants.iter().map(|idx| format!("P{}", idx % personas.len())).collect();
        text.push_str(&format!(
            "@Collaboration({{ name: 'Team', participants: [{}] }})\nclass Team {{}}\n",
            names.join(", ")
        ));

        let report = analyze_strict(&[("model.ts", &text)]);
        let mut edits = report.fixes_for(&FileId::new("model.ts"));
        edits.sort_by_key(|edit| (edit.range.start, edit.range.end));
        for pair in edits.windows(2) {
            prop_assert!(pair[0].range.end <= pair[1].range.start, "{:?}", pair);
        }

        let outcome = apply_fixes(&text, edits);
        prop_assert!(outcome.deferred.is_empty());
    }
}

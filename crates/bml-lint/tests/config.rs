//! Configuration and rule scheduling

use bml_lint::{
    Analyzer, Category, ConfigError, Diagnostic, LintConfig, Profile, Rule, RuleContext, RuleRegistry, Severity,
    SeverityTable,
};
use bml_model::{AnnotationKind, AnnotationRecord};
use bml_test_utils::{analyze_with, host};
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

static CALLS: AtomicUsize = AtomicUsize::new(0);

fn counting(_: &AnnotationRecord, _: &RuleContext<'_>) -> Vec<Diagnostic> {
    CALLS.fetch_add(1, Ordering::SeqCst);
    Vec::new()
}

const PERSONA: &str = "@Persona({ name: 'P', goals: ['g'] }) class P {}";

#[test]
fn disabled_rule_is_never_invoked() {
    let rule = Rule::record("counting", "counts calls", Category::Structural, &[AnnotationKind::Persona], counting);
    let registry = RuleRegistry::new(vec![rule]).unwrap();
    let (host, files) = host(&[("p.ts", PERSONA)]);

    let off = BTreeMap::from([("counting".to_string(), Severity::Off)]);
    let report = Analyzer::with_severities(registry.clone(), SeverityTable::from_map(&registry, &off).unwrap())
        .run(host.clone(), &files);
    assert_eq!(CALLS.load(Ordering::SeqCst), 0);
    assert_eq!(report.stats.invocations("counting"), 0);

    let on = BTreeMap::from([("counting".to_string(), Severity::Warn)]);
    let report = Analyzer::with_severities(registry.clone(), SeverityTable::from_map(&registry, &on).unwrap())
        .run(host, &files);
    assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    assert_eq!(report.stats.invocations("counting"), 1);
}

#[test]
fn builtin_rule_switched_off() {
    let report = analyze_with(
        &[("p.ts", "@Persona({ name: 'P' }) class P {}")],
        &LintConfig::new().with_rule("persona-require-goals", Severity::Off),
    );
    assert_eq!(report.stats.invocations("persona-require-goals"), 0);
    assert!(report.findings_for("persona-require-goals").next().is_none());
}

#[test]
fn profiles_set_best_practice_severity() {
    let files = [("p.ts", "@Persona({ name: 'P', goals: ['g'] }) class P {}")];
    let recommended = analyze_with(&files, &LintConfig::new());
    let all = analyze_with(&files, &LintConfig::new().with_profile(Profile::All));

    let pain = |report: &bml_lint::Report| report.findings_for("persona-require-pain-points").next().map(|f| f.severity);
    assert_eq!(pain(&recommended), Some(Severity::Warn));
    assert_eq!(pain(&all), Some(Severity::Error));
    assert!(!recommended.has_errors());
    assert!(all.has_errors());
}

#[test]
fn unresolved_policy_caps_severity() {
    let text = "@Metric({ name: 'M', unit: 'ms', owner: Ghost }) class M {}";
    let report = analyze_with(&[("m.ts", text)], &LintConfig::new().with_profile(Profile::All));
    let owner = report.findings_for("metric-owner-reference").next().unwrap();
    assert_eq!(owner.message_id, "unresolvedReference");
    assert_eq!(owner.severity, Severity::Warn);
}

#[test]
fn unknown_override_stops_before_analysis() {
    let registry = RuleRegistry::builtin().unwrap();
    let config = LintConfig::new().with_rule("persona-require-hobbies", Severity::Error);
    assert!(matches!(
        Analyzer::new(registry, &config),
        Err(ConfigError::UnknownRule(id)) if id == "persona-require-hobbies"
    ));
}

#[test]
fn loads_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "profile = \"all\"\n[rules]\n\"require-description\" = \"off\"").unwrap();
    let config = LintConfig::load(file.path()).unwrap();
    assert_eq!(config.profile, Profile::All);
    assert_eq!(config.rules.get("require-description"), Some(&Severity::Off));

    writeln!(file, "colour = \"red\"").unwrap();
    assert!(matches!(LintConfig::load(file.path()), Err(ConfigError::Parse { .. })));
}

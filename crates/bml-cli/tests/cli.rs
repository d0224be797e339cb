//! End-to-end runs over temporary directories

use bml_cli::{run, Cli, Outcome};
use clap::Parser;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CLEAN: &str = "@Persona({ name: 'Shopper', description: 'Buys things', goals: ['buy'], painPoints: ['slow checkout'] })\nexport class Shopper {}\n";

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, text) in files {
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }
    dir
}

fn lint(args: &[&str], dir: &Path) -> (Outcome, String) {
    let dir = dir.to_string_lossy().to_string();
    let cli = Cli::parse_from(["bml-lint"].iter().copied().chain(args.iter().copied()).chain([dir.as_str()]));
    let mut out = Vec::new();
    let outcome = run(&cli, &mut out).unwrap();
    (outcome, String::from_utf8(out).unwrap())
}

#[test]
fn clean_project_exits_zero() {
    let dir = project(&[("model/personas.ts", CLEAN)]);
    let (outcome, out) = lint(&[], dir.path());
    assert_eq!(outcome, Outcome::Clean);
    assert_eq!(out, "1 files, 0 errors, 0 warnings\n");
}

#[test]
fn errors_fail_the_run() {
    let dir = project(&[("actions.ts", "@Action({ name: 'A', description: 'a', triggers: [A] })\nexport class A {}\n")]);
    let (outcome, out) = lint(&[], dir.path());
    assert_eq!(outcome, Outcome::Errors);
    assert!(out.contains("Action trigger cycle: A -> A [action-no-trigger-cycles]"));
}

#[test]
fn json_output_lists_findings() {
    let dir = project(&[("p.ts", "@Persona({ name: 'P', description: 'd', goals: ['g'], painPoints: ['p'], hobby: 1 })\nclass P {}\n")]);
    let (_, out) = lint(&["--format", "json"], dir.path());
    let findings: serde_json::Value = serde_json::from_str(&out).unwrap();
    let findings = findings.as_array().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0]["ruleId"], "no-unknown-fields");
    assert_eq!(findings[0]["messageId"], "unknownField");
    assert_eq!(findings[0]["severity"], "error");
    assert_eq!(findings[0]["line"], 1);
}

#[test]
fn rule_overrides_from_flags() {
    let dir = project(&[("p.ts", "@Persona({ name: 'P', description: 'd', painPoints: ['p'] })\nclass P {}\n")]);
    let (outcome, _) = lint(&[], dir.path());
    assert_eq!(outcome, Outcome::Errors);

    let (outcome, out) = lint(&["--rule", "persona-require-goals=warn"], dir.path());
    assert_eq!(outcome, Outcome::Clean);
    assert!(out.contains("warn"));
}

#[test]
fn fix_rewrites_files() {
    let text = "@Stakeholder({ name: 'Ops', description: 'd', role: 'ops', influence: 'HIGH', interest: 'Low' })\nexport class Ops {}\n";
    let dir = project(&[("s.ts", text)]);
    let (outcome, _) = lint(&["--fix"], dir.path());
    assert_eq!(outcome, Outcome::Clean);
    assert_eq!(
        fs::read_to_string(dir.path().join("s.ts")).unwrap(),
        "@Stakeholder({ name: 'Ops', description: 'd', role: 'ops', influence: 'high', interest: 'low' })\nexport class Ops {}\n"
    );
}

#[test]
fn config_file_and_bad_flags() {
    let dir = project(&[("p.ts", CLEAN), ("bml-lint.toml", "profile = \"all\"\n")]);
    let config = dir.path().join("bml-lint.toml");
    let cli = Cli::parse_from([
        "bml-lint",
        "--config",
        config.to_str().unwrap(),
        "--rule",
        "persona-require-hobbies=warn",
        dir.path().to_str().unwrap(),
    ]);
    let err = run(&cli, &mut Vec::new()).unwrap_err();
    assert!(err.to_string().contains("persona-require-hobbies"));

    let cli = Cli::parse_from(["bml-lint", "--profile", "strict", dir.path().to_str().unwrap()]);
    assert!(run(&cli, &mut Vec::new()).is_err());
}

#[test]
fn list_rules_shows_effective_severity() {
    let cli = Cli::parse_from(["bml-lint", "--list-rules", "--rule", "require-description=off"]);
    let mut out = Vec::new();
    assert_eq!(run(&cli, &mut out).unwrap(), Outcome::Clean);
    let out = String::from_utf8(out).unwrap();
    let line = out.lines().find(|l| l.starts_with("require-description ")).unwrap();
    assert!(line.contains(" off "));
    assert!(out.lines().any(|l| l.starts_with("action-no-trigger-cycles") && l.contains("graph")));
}

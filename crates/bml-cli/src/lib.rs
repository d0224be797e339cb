//! BML CLI
//!
//! `bml-lint [PATHS]...` discovers `.ts`/`.tsx` files, runs the analyzer and
//! prints findings. Exit status: `0` clean, `1` error findings, `2` invalid
//! configuration or unreadable input.

#![warn(missing_docs)]

use anyhow::{bail, Context, Result};
use bml_lint::{
    apply_fixes, Analyzer, LintConfig, Profile, Report, RuleRegistry, CONFIG_FILE,
};
use bml_syntax::{FileId, FsHost, ModuleHost};
use clap::{Parser, ValueEnum};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Passes of `--fix` before giving up on reaching a fixed point
pub const MAX_FIX_PASSES: usize = 10;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// `file:line:col: severity message [rule]`
    #[default]
    Text,
    /// Findings as a JSON array
    Json,
}

/// Static analyzer for business-model annotations
#[derive(Debug, Parser)]
#[command(name = "bml-lint", version, about)]
pub struct Cli {
    /// Files or directories to analyze
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Config file (default: ./bml-lint.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Severity profile: recommended or all
    #[arg(long)]
    pub profile: Option<String>,

    /// Rule override, `rule-id=off|warn|error` (repeatable)
    #[arg(long = "rule", value_name = "RULE=SEVERITY")]
    pub rules: Vec<String>,

    /// Apply offered fixes to the files
    #[arg(long)]
    pub fix: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// List rules with their effective severity and exit
    #[arg(long)]
    pub list_rules: bool,
}

/// What a finished run reports to the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No error findings
    Clean,
    /// At least one error finding
    Errors,
}

impl Outcome {
    /// Process exit code
    #[must_use]
    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Clean => ExitCode::SUCCESS,
            Outcome::Errors => ExitCode::from(1),
        }
    }
}

/// Install the stderr subscriber; `RUST_LOG` wins over `--verbose`
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // a second call (tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Build the effective configuration from the config file and flags
///
/// # Errors
/// Returns error if the config file is unreadable or a flag is invalid
pub fn load_config(cli: &Cli) -> Result<LintConfig> {
    let mut config = match &cli.config {
        Some(path) => LintConfig::load(path)?,
        None if Path::new(CONFIG_FILE).is_file() => LintConfig::load(Path::new(CONFIG_FILE))?,
        None => LintConfig::new(),
    };
    if let Some(profile) = &cli.profile {
        config = config.with_profile(profile.parse::<Profile>()?);
    }
    for spec in &cli.rules {
        config = config.with_override(spec)?;
    }
    if cli.fix {
        config = config.with_fix(true);
    }
    Ok(config)
}

/// Run the command, writing findings to `out`
///
/// # Errors
/// Returns error on invalid configuration, unreadable inputs or write failures
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<Outcome> {
    let config = load_config(cli)?;
    let analyzer = Analyzer::new(RuleRegistry::builtin()?, &config)?.with_fixes(false);

    if cli.list_rules {
        list_rules(&analyzer, out)?;
        return Ok(Outcome::Clean);
    }

    let paths = discover(&cli.paths)?;
    if paths.is_empty() {
        bail!("no .ts or .tsx files found under {}", display_paths(&cli.paths));
    }

    if config.fix {
        fix_until_stable(&analyzer, &paths)?;
    }

    let report = analyze(&analyzer, &paths)?;
    write_report(&report, cli.format, out)?;

    Ok(if report.has_errors() {
        Outcome::Errors
    } else {
        Outcome::Clean
    })
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn discover(roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = BTreeSet::new();
    for root in roots {
        if !root.exists() {
            bail!("path does not exist: {}", root.display());
        }
        let found = FsHost::discover(root).with_context(|| format!("reading {}", root.display()))?;
        paths.extend(found);
    }
    Ok(paths.into_iter().collect())
}

fn analyze(analyzer: &Analyzer, paths: &[PathBuf]) -> Result<Report> {
    let host = Arc::new(FsHost::new());
    let mut files = Vec::with_capacity(paths.len());
    for (path, loaded) in paths.iter().zip(host.load_all(paths)) {
        let file = loaded.with_context(|| format!("loading {}", path.display()))?;
        files.push(file.id().clone());
    }
    tracing::debug!(files = files.len(), "loaded inputs");
    let host: Arc<dyn ModuleHost> = host;
    Ok(analyzer.run(host, &files))
}

/// Apply fixes pass by pass until no fix applies or the pass limit is hit
fn fix_until_stable(analyzer: &Analyzer, paths: &[PathBuf]) -> Result<()> {
    let analyzer = analyzer.clone().with_fixes(true);
    for pass in 1..=MAX_FIX_PASSES {
        let report = analyze(&analyzer, paths)?;
        let files: BTreeSet<&FileId> = report
            .findings
            .iter()
            .filter(|f| f.fix.is_some())
            .map(|f| &f.file)
            .collect();
        if files.is_empty() {
            tracing::debug!(pass, "no fixes left");
            return Ok(());
        }

        let mut applied = 0;
        for file in files {
            let path = Path::new(file.as_str());
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {file}"))?;
            let outcome = apply_fixes(&text, report.fixes_for(file));
            applied += outcome.applied.len();
            if !outcome.applied.is_empty() {
                std::fs::write(path, outcome.text).with_context(|| format!("writing {file}"))?;
            }
        }
        tracing::info!(pass, applied, "applied fixes");
        if applied == 0 {
            return Ok(());
        }
    }
    tracing::warn!(passes = MAX_FIX_PASSES, "fixes did not settle; remaining findings are reported");
    Ok(())
}

fn list_rules(analyzer: &Analyzer, out: &mut impl Write) -> Result<()> {
    for rule in analyzer.registry().iter() {
        let scope = if rule.check.is_graph() { "graph" } else { "record" };
        let fix = if rule.fix.is_some() { " (fixable)" } else { "" };
        writeln!(
            out,
            "{:<45} {:<5} {:<6} {}{fix}",
            rule.id,
            analyzer.severities().get(rule.id),
            scope,
            rule.description
        )?;
    }
    Ok(())
}

/// Print findings in the requested format
///
/// # Errors
/// Returns error if writing fails
pub fn write_report(report: &Report, format: Format, out: &mut impl Write) -> Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, &report.findings)?;
            writeln!(out)?;
        }
        Format::Text => {
            for finding in &report.findings {
                writeln!(out, "{finding}")?;
            }
            writeln!(
                out,
                "{} files, {} errors, {} warnings",
                report.stats.files,
                report.errors(),
                report.warnings()
            )?;
        }
    }
    Ok(())
}

//! Rule execution
//!
//! One [`Analyzer::run`] is one analysis run:
//! 1. extract every file and seed the resolver with the results
//! 2. run record-scoped rules per file, records in declaration order
//! 3. barrier: run graph-scoped rules once over the full record set
//! 4. attach fixes (when requested), dropping any that overlap an earlier one
//!
//! Rules configured `off`, or whose kinds no record has, are never invoked.

use crate::config::{LintConfig, SeverityTable};
use crate::error::ConfigError;
use crate::finding::{Diagnostic, Finding};
use crate::fix::{select_non_overlapping, TextEdit};
use crate::graph::TriggerGraph;
use crate::registry::RuleRegistry;
use crate::rule::{CheckFn, FixContext, RecordSet, Rule, RuleContext};
use crate::severity::Severity;
use bml_model::{extract_module, AnnotationRecord, ModuleIndex};
use bml_resolve::{Resolver, ResolverStats};
use bml_syntax::{FileId, ModuleHost, SourceFile};
use once_cell::unsync::OnceCell;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Counters of one run
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    /// Files analyzed
    pub files: usize,
    /// Annotation records extracted from them
    pub records: usize,
    /// Rules that were active (enabled and applicable)
    pub rules_run: usize,
    /// `check` invocations per rule id
    pub invocations: BTreeMap<&'static str, usize>,
    /// Fixes dropped because they overlapped an earlier fix
    pub fixes_dropped: usize,
    /// Resolver cache counters
    #[serde(skip)]
    pub resolver: ResolverStats,
}

impl RunStats {
    /// Number of `check` invocations of a rule
    #[inline]
    #[must_use]
    pub fn invocations(&self, rule_id: &str) -> usize {
        self.invocations.get(rule_id).copied().unwrap_or(0)
    }
}

/// Result of one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    /// Findings sorted by file, offset, rule id
    pub findings: Vec<Finding>,
    /// Run counters
    pub stats: RunStats,
}

impl Report {
    /// Check if any finding has severity `error`
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(Finding::is_error)
    }

    /// Number of error findings
    #[must_use]
    pub fn errors(&self) -> usize {
        self.findings.iter().filter(|f| f.severity == Severity::Error).count()
    }

    /// Number of warning findings
    #[must_use]
    pub fn warnings(&self) -> usize {
        self.findings.iter().filter(|f| f.severity == Severity::Warn).count()
    }

    /// Findings of one rule
    pub fn findings_for<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.findings.iter().filter(move |f| f.rule_id == rule_id)
    }

    /// Attached fixes for one file
    #[must_use]
    pub fn fixes_for(&self, file: &FileId) -> Vec<TextEdit> {
        self.findings
            .iter()
            .filter(|f| &f.file == file)
            .filter_map(|f| f.fix.clone())
            .collect()
    }
}

struct Unit {
    source: Arc<SourceFile>,
    module: Arc<ModuleIndex>,
}

/// Runs registered rules over a set of files
#[derive(Debug, Clone)]
pub struct Analyzer {
    registry: RuleRegistry,
    severities: SeverityTable,
    fixes: bool,
}

impl Analyzer {
    /// Create an analyzer from a registry and user configuration
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the configuration does not match the registry
    pub fn new(registry: RuleRegistry, config: &LintConfig) -> Result<Self, ConfigError> {
        let severities = config.severity_table(&registry)?;
        tracing::debug!(rules = registry.len(), enabled = severities.enabled(), profile = %config.profile, "analyzer configured");
        Ok(Self {
            registry,
            severities,
            fixes: config.fix,
        })
    }

    /// Create an analyzer from an already validated severity table
    #[must_use]
    pub fn with_severities(registry: RuleRegistry, severities: SeverityTable) -> Self {
        Self {
            registry,
            severities,
            fixes: false,
        }
    }

    /// Attach fixes to fixable findings
    #[inline]
    #[must_use]
    pub fn with_fixes(mut self, fixes: bool) -> Self {
        self.fixes = fixes;
        self
    }

    /// The rule registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Effective severities
    #[inline]
    #[must_use]
    pub fn severities(&self) -> &SeverityTable {
        &self.severities
    }

    /// Analyze `files`, following imports through `host`
    pub fn run(&self, host: Arc<dyn ModuleHost>, files: &[FileId]) -> Report {
        let resolver = Resolver::new(host.clone());
        let mut stats = RunStats::default();

        let mut files = files.to_vec();
        files.sort();
        files.dedup();

        let mut units = Vec::with_capacity(files.len());
        for file in &files {
            let Some(source) = host.source(file) else {
                tracing::warn!(file = %file, "file not available, skipped");
                continue;
            };
            let module = resolver.seed(Arc::new(extract_module(&source)));
            tracing::debug!(file = %file, records = module.records().len(), "extracted");
            units.push(Unit { source, module });
        }

        let records = RecordSet::new(
            units
                .iter()
                .flat_map(|unit| unit.module.records().iter().cloned())
                .collect(),
        );
        stats.files = units.len();
        stats.records = records.len();

        let active: Vec<(&Rule, Severity)> = self
            .registry
            .iter()
            .filter_map(|rule| {
                let severity = self.severities.get(rule.id);
                (severity.is_enabled() && records.intersects(rule.applies_to)).then_some((rule, severity))
            })
            .collect();
        stats.rules_run = active.len();

        let graph = OnceCell::<TriggerGraph>::new();
        let mut findings = Vec::new();

        for unit in &units {
            let fix_ctx = FixContext {
                text: unit.source.text(),
            };
            for record in unit.module.records() {
                for (rule, severity) in &active {
                    let CheckFn::Record(check) = rule.check else {
                        continue;
                    };
                    if !rule.applies_to(record.kind()) || (record.is_malformed() && !rule.accepts_malformed) {
                        continue;
                    }
                    let ctx = RuleContext::new(rule, &resolver, &records, &graph);
                    let diagnostics = check(record, &ctx);
                    *stats.invocations.entry(rule.id).or_default() += 1;
                    tracing::trace!(rule = rule.id, owner = record.owner_name(), found = diagnostics.len(), "checked record");

                    for diagnostic in diagnostics {
                        findings.push(self.finding(rule, *severity, Some((record, &fix_ctx)), diagnostic));
                    }
                }
            }
        }

        // barrier: every file is extracted before graph rules see the record set
        for (rule, severity) in &active {
            let CheckFn::Graph(check) = rule.check else {
                continue;
            };
            let ctx = RuleContext::new(rule, &resolver, &records, &graph);
            let diagnostics = check(&ctx);
            *stats.invocations.entry(rule.id).or_default() += 1;
            tracing::trace!(rule = rule.id, found = diagnostics.len(), "checked graph");
            for diagnostic in diagnostics {
                findings.push(self.finding(rule, *severity, None, diagnostic));
            }
        }

        findings.sort_by(|a, b| {
            (&a.file, a.range.start, a.rule_id, a.range.end).cmp(&(&b.file, b.range.start, b.rule_id, b.range.end))
        });
        stats.fixes_dropped = drop_overlapping_fixes(&mut findings);
        stats.resolver = resolver.stats();

        let report = Report { findings, stats };
        tracing::info!(
            files = report.stats.files,
            records = report.stats.records,
            rules = report.stats.rules_run,
            errors = report.errors(),
            warnings = report.warnings(),
            resolver_hits = report.stats.resolver.hits,
            resolver_misses = report.stats.resolver.misses,
            "analysis complete"
        );
        report
    }

    fn finding(
        &self,
        rule: &Rule,
        severity: Severity,
        record: Option<(&Arc<AnnotationRecord>, &FixContext<'_>)>,
        diagnostic: Diagnostic,
    ) -> Finding {
        let fix = match (self.fixes && diagnostic.fixable, rule.fix, record) {
            (true, Some(fix), Some((record, ctx))) => {
                let edit = fix(record, &diagnostic, ctx);
                if edit.is_none() {
                    tracing::debug!(rule = rule.id, "fix declined");
                }
                edit
            }
            _ => None,
        };
        let mut finding = Finding::from_diagnostic(rule.id, severity, diagnostic);
        finding.fix = fix;
        finding
    }
}

/// Detach fixes that overlap an earlier fix in the same file
fn drop_overlapping_fixes(findings: &mut [Finding]) -> usize {
    let mut by_file: HashMap<&FileId, Vec<usize>> = HashMap::new();
    for (idx, finding) in findings.iter().enumerate() {
        if finding.fix.is_some() {
            by_file.entry(&finding.file).or_default().push(idx);
        }
    }

    let mut rejected = Vec::new();
    for indices in by_file.into_values() {
        let (_, dropped) = select_non_overlapping(indices, |idx| {
            findings[*idx].fix.as_ref().map(|edit| edit.range).unwrap_or_default()
        });
        rejected.extend(dropped);
    }

    for idx in &rejected {
        let finding = &mut findings[*idx];
        tracing::debug!(rule = finding.rule_id, file = %finding.file, "fix overlaps an earlier fix, dropped");
        finding.fix = None;
    }
    rejected.len()
}

/// Analyze `files` with the built-in rules and `config`
///
/// # Errors
/// Returns [`ConfigError`] if the configuration does not match the registry
pub fn run_all(host: Arc<dyn ModuleHost>, files: &[FileId], config: &LintConfig) -> Result<Report, ConfigError> {
    let analyzer = Analyzer::new(RuleRegistry::builtin()?, config)?;
    Ok(analyzer.run(host, files))
}

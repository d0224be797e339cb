//! Rule definitions
//!
//! A [`Rule`] is plain data: an id, the kinds it applies to, and function
//! pointers. The [`CheckFn`] variant is the scope tag: record-scoped rules are
//! called once per matching record, graph-scoped rules once per run after all
//! files are extracted.

use crate::finding::Diagnostic;
use crate::fix::TextEdit;
use crate::graph::TriggerGraph;
use bml_model::{AnnotationKind, AnnotationRecord};
use bml_resolve::{ResolvedReference, Resolver};
use bml_syntax::FileId;
use once_cell::unsync::OnceCell;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Rule category; decides the `recommended` profile severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// Required fields, shapes, referential integrity
    Structural,
    /// Style and richness checks
    BestPractice,
}

/// How a rule treats references that do not resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UnresolvedPolicy {
    /// Unresolved references are not reported
    Ignore,
    /// Reported, but never above `warn`
    Warn,
    /// Reported at the rule's configured severity
    #[default]
    Error,
}

/// Record-scoped check
pub type RecordCheck = fn(&AnnotationRecord, &RuleContext<'_>) -> Vec<Diagnostic>;

/// Graph-scoped check
pub type GraphCheck = fn(&RuleContext<'_>) -> Vec<Diagnostic>;

/// Fix computation for one diagnostic of one record
pub type FixFn = fn(&AnnotationRecord, &Diagnostic, &FixContext<'_>) -> Option<TextEdit>;

/// Check function, tagged with its scope
#[derive(Clone, Copy)]
pub enum CheckFn {
    /// Called once per record whose kind is in `applies_to`
    Record(RecordCheck),
    /// Called once per run with the whole record set
    Graph(GraphCheck),
}

impl CheckFn {
    /// Check if graph-scoped
    #[inline]
    #[must_use]
    pub fn is_graph(&self) -> bool {
        matches!(self, CheckFn::Graph(_))
    }
}

impl std::fmt::Debug for CheckFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(if self.is_graph() { "Graph" } else { "Record" })
    }
}

/// A registered rule
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Stable id (`action-no-trigger-cycles`)
    pub id: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Category
    pub category: Category,
    /// Kinds the rule applies to
    pub applies_to: &'static [AnnotationKind],
    /// Unresolved reference policy
    pub on_unresolved: UnresolvedPolicy,
    /// Check function
    pub check: CheckFn,
    /// Fix function, if the rule offers fixes
    pub fix: Option<FixFn>,
    /// Also run on records whose argument could not be read
    pub accepts_malformed: bool,
}

impl Rule {
    /// Record-scoped rule
    #[must_use]
    pub const fn record(
        id: &'static str,
        description: &'static str,
        category: Category,
        applies_to: &'static [AnnotationKind],
        check: RecordCheck,
    ) -> Self {
        Self {
            id,
            description,
            category,
            applies_to,
            on_unresolved: UnresolvedPolicy::Error,
            check: CheckFn::Record(check),
            fix: None,
            accepts_malformed: false,
        }
    }

    /// Graph-scoped rule
    #[must_use]
    pub const fn graph(
        id: &'static str,
        description: &'static str,
        category: Category,
        applies_to: &'static [AnnotationKind],
        check: GraphCheck,
    ) -> Self {
        Self {
            id,
            description,
            category,
            applies_to,
            on_unresolved: UnresolvedPolicy::Error,
            check: CheckFn::Graph(check),
            fix: None,
            accepts_malformed: false,
        }
    }

    /// Attach a fix function
    #[must_use]
    pub const fn with_fix(mut self, fix: FixFn) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Set the unresolved reference policy
    #[must_use]
    pub const fn with_unresolved(mut self, policy: UnresolvedPolicy) -> Self {
        self.on_unresolved = policy;
        self
    }

    /// Run on malformed records too
    #[must_use]
    pub const fn accepting_malformed(mut self) -> Self {
        self.accepts_malformed = true;
        self
    }

    /// Check if the rule applies to `kind`
    #[inline]
    #[must_use]
    pub fn applies_to(&self, kind: AnnotationKind) -> bool {
        self.applies_to.contains(&kind)
    }
}

/// All records of one run, in file order then declaration order
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<Arc<AnnotationRecord>>,
    kinds: BTreeSet<AnnotationKind>,
}

impl RecordSet {
    /// Build from records
    #[must_use]
    pub fn new(records: Vec<Arc<AnnotationRecord>>) -> Self {
        let kinds = records.iter().map(|r| r.kind()).collect();
        Self { records, kinds }
    }

    /// Iterate all records
    pub fn iter(&self) -> impl Iterator<Item = &Arc<AnnotationRecord>> {
        self.records.iter()
    }

    /// Records of one kind
    pub fn of_kind(&self, kind: AnnotationKind) -> impl Iterator<Item = &Arc<AnnotationRecord>> {
        self.records.iter().filter(move |r| r.kind() == kind)
    }

    /// Check if any record has one of `kinds`
    #[must_use]
    pub fn intersects(&self, kinds: &[AnnotationKind]) -> bool {
        kinds.iter().any(|k| self.kinds.contains(k))
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// What a check can see besides its record
pub struct RuleContext<'a> {
    rule: &'a Rule,
    resolver: &'a Resolver,
    records: &'a RecordSet,
    graph: &'a OnceCell<TriggerGraph>,
}

impl<'a> RuleContext<'a> {
    pub(crate) fn new(
        rule: &'a Rule,
        resolver: &'a Resolver,
        records: &'a RecordSet,
        graph: &'a OnceCell<TriggerGraph>,
    ) -> Self {
        Self {
            rule,
            resolver,
            records,
            graph,
        }
    }

    /// The rule being run
    #[inline]
    #[must_use]
    pub fn rule(&self) -> &Rule {
        self.rule
    }

    /// Resolve an identifier as seen from `file`
    #[inline]
    #[must_use]
    pub fn resolve(&self, name: &str, file: &FileId) -> Arc<ResolvedReference> {
        self.resolver.resolve(name, file)
    }

    /// All records of the run
    #[inline]
    #[must_use]
    pub fn records(&self) -> &RecordSet {
        self.records
    }

    /// Trigger graph of the run, built on first use
    #[must_use]
    pub fn trigger_graph(&self) -> &TriggerGraph {
        self.graph
            .get_or_init(|| TriggerGraph::build(self.records, self.resolver))
    }
}

/// What a fix function can see
#[derive(Debug, Clone, Copy)]
pub struct FixContext<'a> {
    /// Source text of the record's file
    pub text: &'a str,
}

impl FixContext<'_> {
    /// Source text covered by a range, if in bounds
    #[must_use]
    pub fn slice(&self, range: bml_syntax::TextRange) -> Option<&str> {
        self.text.get(range.start..range.end)
    }
}

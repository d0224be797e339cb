//! Action trigger graph
//!
//! Derived once per run from every Action record: nodes are Actions, edges
//! come from resolved `triggers` entries. Built lazily by the first graph rule
//! that asks for it and shared by the rest.
//!
//! - Cycle detection is a three-color DFS over nodes and successors in
//!   lexical order, so reported cycles do not depend on declaration order.
//!   The DFS keeps its own frame stack, so trigger chain length is not
//!   bounded by the thread stack.
//! - Reachability uses `petgraph`'s DFS.

use crate::rule::RecordSet;
use bml_model::{AnnotationKind, AnnotationRecord, FieldValue, Spanned};
use bml_resolve::{ResolvedReference, Resolver, UnresolvedReason};
use bml_syntax::{FileId, Span};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// One Action in the graph
#[derive(Debug, Clone)]
pub struct ActionNode {
    /// The Action record
    pub record: Arc<AnnotationRecord>,
    /// Record belongs to the analyzed files (not only reached through imports)
    pub in_run: bool,
}

/// One `triggers` edge
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerEdge {
    /// `condition` of the trigger object, if any
    pub condition: Option<String>,
    /// Span of the trigger entry
    pub span: Span,
}

/// A trigger entry that produced no edge
#[derive(Debug, Clone)]
pub enum TriggerProblem {
    /// The identifier does not resolve
    Dangling {
        /// Action holding the trigger
        source: Arc<AnnotationRecord>,
        /// Identifier as written
        target: String,
        /// Span of the identifier
        span: Span,
        /// Why it did not resolve
        reason: UnresolvedReason,
    },
    /// The identifier resolves to a class that is not an Action
    NotAction {
        /// Action holding the trigger
        source: Arc<AnnotationRecord>,
        /// Identifier as written
        target: String,
        /// Span of the identifier
        span: Span,
        /// Kinds the class is annotated with
        kinds: String,
    },
}

/// Identifier, its span and condition of one trigger entry
pub(crate) fn trigger_target(entry: &Spanned<FieldValue>) -> Option<(&str, Span, Option<&str>)> {
    match &entry.value {
        FieldValue::Reference(name) => Some((name, entry.span, None)),
        FieldValue::Object(map) => {
            let action = map.get("action")?;
            let name = action.value.value.as_reference()?;
            Some((name, action.value.span, map.str("condition")))
        }
        _ => None,
    }
}

type NodeKey = (FileId, String);

fn key_of(record: &AnnotationRecord) -> NodeKey {
    (record.source_file().clone(), record.owner_name().to_string())
}

/// Directed graph of Action triggers
#[derive(Debug, Default)]
pub struct TriggerGraph {
    graph: DiGraph<ActionNode, TriggerEdge>,
    index: HashMap<NodeKey, NodeIndex>,
    problems: Vec<TriggerProblem>,
}

impl TriggerGraph {
    /// Build the graph from all Action records of a run
    #[must_use]
    pub fn build(records: &RecordSet, resolver: &Resolver) -> Self {
        let mut graph = Self::default();
        for record in records.of_kind(AnnotationKind::Action) {
            graph.add_node(record, true);
        }

        for record in records.of_kind(AnnotationKind::Action) {
            let Some(&source) = graph.index.get(&key_of(record)) else {
                continue;
            };
            let Some(entries) = record.fields().list("triggers") else {
                continue;
            };
            for entry in entries {
                let Some((name, span, condition)) = trigger_target(entry) else {
                    continue;
                };
                graph.add_trigger(resolver, record, source, name, span, condition);
            }
        }

        tracing::debug!(
            nodes = graph.graph.node_count(),
            edges = graph.graph.edge_count(),
            problems = graph.problems.len(),
            "built trigger graph"
        );
        graph
    }

    fn add_node(&mut self, record: &Arc<AnnotationRecord>, in_run: bool) -> NodeIndex {
        let key = key_of(record);
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = self.graph.add_node(ActionNode {
            record: Arc::clone(record),
            in_run,
        });
        self.index.insert(key, idx);
        idx
    }

    fn add_trigger(
        &mut self,
        resolver: &Resolver,
        record: &Arc<AnnotationRecord>,
        source: NodeIndex,
        name: &str,
        span: Span,
        condition: Option<&str>,
    ) {
        match resolver.resolve(name, record.source_file()).as_ref() {
            ResolvedReference::Annotated(class) => match class.record(AnnotationKind::Action) {
                Some(target) => {
                    let target = self.add_node(target, false);
                    self.graph.add_edge(
                        source,
                        target,
                        TriggerEdge {
                            condition: condition.map(str::to_string),
                            span,
                        },
                    );
                }
                None => self.problems.push(TriggerProblem::NotAction {
                    source: Arc::clone(record),
                    target: name.to_string(),
                    span,
                    kinds: class.kinds_label(),
                }),
            },
            ResolvedReference::Unresolved(reason) => self.problems.push(TriggerProblem::Dangling {
                source: Arc::clone(record),
                target: name.to_string(),
                span,
                reason: reason.clone(),
            }),
        }
    }

    /// Number of Actions
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of trigger edges
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node weight
    #[inline]
    #[must_use]
    pub fn node(&self, idx: NodeIndex) -> &ActionNode {
        &self.graph[idx]
    }

    /// Node of an Action declared as `owner` in `file`
    #[must_use]
    pub fn node_of(&self, file: &FileId, owner: &str) -> Option<NodeIndex> {
        self.index.get(&(file.clone(), owner.to_string())).copied()
    }

    /// All nodes
    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Trigger entries that produced no edge
    #[inline]
    #[must_use]
    pub fn problems(&self) -> &[TriggerProblem] {
        &self.problems
    }

    /// Conditions on the edges `from -> to`
    pub fn conditions(&self, from: NodeIndex, to: NodeIndex) -> impl Iterator<Item = Option<&str>> {
        self.graph
            .edges_connecting(from, to)
            .map(|edge| edge.weight().condition.as_deref())
    }

    fn sort_key(&self, idx: NodeIndex) -> (&str, &FileId, usize) {
        let record = &self.graph[idx].record;
        (record.owner_name(), record.source_file(), record.span().range.start)
    }

    fn sorted(&self, mut nodes: Vec<NodeIndex>) -> Vec<NodeIndex> {
        nodes.sort_by(|a, b| self.sort_key(*a).cmp(&self.sort_key(*b)));
        nodes.dedup();
        nodes
    }

    /// Every distinct cycle, each starting at its lexically first Action
    ///
    /// Cycles are listed in the order the DFS finds them; a self-loop is a
    /// cycle of one node.
    #[must_use]
    pub fn cycles(&self) -> Vec<Vec<NodeIndex>> {
        let mut state = vec![Color::White; self.graph.node_count()];
        let mut path = Vec::new();
        let mut seen = HashSet::new();
        let mut cycles = Vec::new();

        for root in self.sorted(self.graph.node_indices().collect()) {
            if state[root.index()] == Color::White {
                self.visit(root, &mut state, &mut path, &mut seen, &mut cycles);
            }
        }
        cycles
    }

    /// Depth-first from `root` with an explicit frame stack; `path` mirrors
    /// the gray nodes on it
    fn visit(
        &self,
        root: NodeIndex,
        state: &mut [Color],
        path: &mut Vec<NodeIndex>,
        seen: &mut HashSet<Vec<NodeIndex>>,
        cycles: &mut Vec<Vec<NodeIndex>>,
    ) {
        state[root.index()] = Color::Gray;
        path.push(root);
        let mut frames = vec![(root, self.successors(root))];

        loop {
            let (node, next) = match frames.last_mut() {
                Some((node, successors)) => (*node, successors.next()),
                None => break,
            };
            let Some(next) = next else {
                frames.pop();
                path.pop();
                state[node.index()] = Color::Black;
                continue;
            };
            match state[next.index()] {
                Color::White => {
                    state[next.index()] = Color::Gray;
                    path.push(next);
                    frames.push((next, self.successors(next)));
                }
                Color::Gray => {
                    let Some(start) = path.iter().position(|n| *n == next) else {
                        continue;
                    };
                    let cycle = self.rotate(&path[start..]);
                    if seen.insert(cycle.clone()) {
                        cycles.push(cycle);
                    }
                }
                Color::Black => {}
            }
        }
    }

    fn successors(&self, node: NodeIndex) -> std::vec::IntoIter<NodeIndex> {
        self.sorted(self.graph.neighbors(node).collect()).into_iter()
    }

    fn rotate(&self, cycle: &[NodeIndex]) -> Vec<NodeIndex> {
        let first = (0..cycle.len())
            .min_by(|a, b| self.sort_key(cycle[*a]).cmp(&self.sort_key(cycle[*b])))
            .unwrap_or(0);
        cycle[first..].iter().chain(&cycle[..first]).copied().collect()
    }

    /// `A -> B -> C -> A`
    #[must_use]
    pub fn cycle_label(&self, cycle: &[NodeIndex]) -> String {
        cycle
            .iter()
            .chain(cycle.first())
            .map(|idx| self.graph[*idx].record.owner_name())
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Nodes reachable from `roots` (roots included)
    #[must_use]
    pub fn reachable_from(&self, roots: impl IntoIterator<Item = NodeIndex>) -> HashSet<NodeIndex> {
        let mut reached = HashSet::new();
        for root in roots {
            if reached.contains(&root) {
                continue;
            }
            let mut dfs = Dfs::new(&self.graph, root);
            while let Some(node) = dfs.next(&self.graph) {
                reached.insert(node);
            }
        }
        reached
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

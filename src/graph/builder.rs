//! Graph construction and build-time validation
//!
//! `GraphBuilder` collects nodes and edges through a chained API and
//! validates the whole configuration eagerly in `build()`: every declared
//! routing code maps to exactly one target, every referenced node exists,
//! every node has an outgoing edge, fan-out siblings write disjoint fields,
//! and the only cycles are explicit bounded retry edges. Misconfiguration
//! therefore surfaces at process start, before any traffic runs.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::node::{Node, SharedNode};
use super::routing::{Decision, RouteCode, RouteTable, RouteTarget, Selector};
use super::state::GraphState;

/// Configuration error detected while building a graph.
#[derive(Debug, Error, PartialEq)]
pub enum GraphBuildError {
    #[error("graph has no entry point")]
    NoEntryPoint,

    #[error("node '{0}' registered more than once")]
    DuplicateNode(String),

    #[error("unknown node '{name}' referenced by {referenced_by}")]
    UnknownNode { name: String, referenced_by: String },

    #[error("node '{0}' has more than one outgoing edge")]
    DuplicateEdge(String),

    #[error("node '{0}' has no outgoing edge")]
    MissingEdge(String),

    #[error("decision at '{node}' declares an empty code domain")]
    EmptyDomain { node: String },

    #[error("route table at '{node}' maps code {code} more than once")]
    DuplicateRoute { node: String, code: RouteCode },

    #[error("route table at '{node}' has no entry for declared code {code}")]
    MissingRoute { node: String, code: RouteCode },

    #[error("route table at '{node}' maps undeclared code {code}")]
    UndeclaredRoute { node: String, code: RouteCode },

    #[error("fan-out at '{node}' declares no targets")]
    EmptyFanOut { node: String },

    #[error("fan-out at '{node}' lists target '{target}' more than once")]
    DuplicateTarget { node: String, target: String },

    #[error("fan-out at '{node}' uses its join node '{join}' as a target")]
    JoinInTargets { node: String, join: String },

    #[error("fan-out target '{0}' may not have its own outgoing edge")]
    FanOutTargetEdge(String),

    #[error("fan-out targets '{first}' and '{second}' both write field '{field}'")]
    OverlappingWrites {
        first: String,
        second: String,
        field: &'static str,
    },

    #[error("cycle without a retry edge: {}", path.join(" -> "))]
    UnboundedCycle { path: Vec<String> },
}

/// Outgoing edge of a node in a built graph.
pub enum Edge<S: GraphState> {
    /// Unconditional successor.
    Direct(RouteTarget),
    /// Decision function with its validated code table.
    Branch {
        decision: Decision<S>,
        table: HashMap<RouteCode, RouteTarget>,
    },
    /// Concurrent activation of a subset of `targets`, joined at `join`.
    FanOut {
        selector: Selector<S>,
        targets: Vec<String>,
        join: String,
    },
}

impl<S: GraphState> fmt::Debug for Edge<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(target) => f.debug_tuple("Direct").field(target).finish(),
            Self::Branch { table, .. } => f.debug_struct("Branch").field("table", table).finish(),
            Self::FanOut { targets, join, .. } => f
                .debug_struct("FanOut")
                .field("targets", targets)
                .field("join", join)
                .finish(),
        }
    }
}

enum EdgeSpec<S: GraphState> {
    Direct(RouteTarget),
    Branch(Decision<S>, RouteTable),
    FanOut(Selector<S>, Vec<String>, String),
}

/// Chained builder for a workflow graph.
pub struct GraphBuilder<S: GraphState> {
    name: String,
    nodes: Vec<(String, SharedNode<S>)>,
    entry: Option<String>,
    edges: Vec<(String, EdgeSpec<S>)>,
}

impl<S: GraphState> GraphBuilder<S> {
    /// Start a builder for a named graph.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            entry: None,
            edges: Vec::new(),
        }
    }

    /// Register a node under a graph-local name.
    pub fn node(mut self, name: impl Into<String>, node: impl Node<S> + 'static) -> Self {
        self.nodes.push((name.into(), Arc::new(node)));
        self
    }

    /// Register an already-shared node, e.g. one reused across graphs.
    pub fn shared_node(mut self, name: impl Into<String>, node: SharedNode<S>) -> Self {
        self.nodes.push((name.into(), node));
        self
    }

    /// Designate the entry node.
    pub fn entry(mut self, name: impl Into<String>) -> Self {
        self.entry = Some(name.into());
        self
    }

    /// Register an unconditional edge. `END` terminates the invocation.
    pub fn edge(mut self, from: impl Into<String>, to: impl Into<RouteTarget>) -> Self {
        self.edges.push((from.into(), EdgeSpec::Direct(to.into())));
        self
    }

    /// Register a conditional edge: a decision function plus its code table.
    pub fn branch(
        mut self,
        from: impl Into<String>,
        decision: Decision<S>,
        table: RouteTable,
    ) -> Self {
        self.edges
            .push((from.into(), EdgeSpec::Branch(decision, table)));
        self
    }

    /// Register a fan-out edge: the selector activates a subset of
    /// `targets`, whose updates are joined before `join` runs.
    pub fn fan_out(
        mut self,
        from: impl Into<String>,
        selector: Selector<S>,
        targets: impl IntoIterator<Item = impl Into<String>>,
        join: impl Into<String>,
    ) -> Self {
        self.edges.push((
            from.into(),
            EdgeSpec::FanOut(
                selector,
                targets.into_iter().map(Into::into).collect(),
                join.into(),
            ),
        ));
        self
    }

    /// Validate the configuration and produce an immutable graph.
    pub fn build(self) -> Result<Graph<S>, GraphBuildError> {
        let entry = self.entry.ok_or(GraphBuildError::NoEntryPoint)?;

        let mut order = Vec::with_capacity(self.nodes.len());
        let mut nodes: HashMap<String, SharedNode<S>> = HashMap::new();
        for (name, node) in self.nodes {
            if nodes.insert(name.clone(), node).is_some() {
                return Err(GraphBuildError::DuplicateNode(name));
            }
            order.push(name);
        }

        let known = |name: &str, referenced_by: String| -> Result<(), GraphBuildError> {
            if nodes.contains_key(name) {
                Ok(())
            } else {
                Err(GraphBuildError::UnknownNode {
                    name: name.to_string(),
                    referenced_by,
                })
            }
        };

        known(&entry, "entry point".to_string())?;

        let mut edges: HashMap<String, Edge<S>> = HashMap::new();
        let mut fan_targets: HashSet<String> = HashSet::new();

        for (from, spec) in self.edges {
            known(&from, "edge registration".to_string())?;
            if edges.contains_key(&from) {
                return Err(GraphBuildError::DuplicateEdge(from));
            }

            let edge = match spec {
                EdgeSpec::Direct(target) => {
                    Self::check_target(&target, &from, &known)?;
                    Edge::Direct(target)
                }
                EdgeSpec::Branch(decision, table) => {
                    if decision.codes().is_empty() {
                        return Err(GraphBuildError::EmptyDomain { node: from });
                    }
                    let mut mapped: HashMap<RouteCode, RouteTarget> = HashMap::new();
                    for (code, target) in table.into_entries() {
                        Self::check_target(&target, &from, &known)?;
                        if !decision.codes().contains(&code) {
                            return Err(GraphBuildError::UndeclaredRoute { node: from, code });
                        }
                        if mapped.insert(code.clone(), target).is_some() {
                            return Err(GraphBuildError::DuplicateRoute { node: from, code });
                        }
                    }
                    for code in decision.codes() {
                        if !mapped.contains_key(code) {
                            return Err(GraphBuildError::MissingRoute {
                                node: from,
                                code: code.clone(),
                            });
                        }
                    }
                    Edge::Branch {
                        decision,
                        table: mapped,
                    }
                }
                EdgeSpec::FanOut(selector, targets, join) => {
                    if targets.is_empty() {
                        return Err(GraphBuildError::EmptyFanOut { node: from });
                    }
                    let mut seen = HashSet::new();
                    for target in &targets {
                        known(target, format!("fan-out from '{from}'"))?;
                        if !seen.insert(target.clone()) {
                            return Err(GraphBuildError::DuplicateTarget {
                                node: from,
                                target: target.clone(),
                            });
                        }
                    }
                    known(&join, format!("fan-out join from '{from}'"))?;
                    if targets.contains(&join) {
                        return Err(GraphBuildError::JoinInTargets { node: from, join });
                    }
                    fan_targets.extend(targets.iter().cloned());
                    Edge::FanOut {
                        selector,
                        targets,
                        join,
                    }
                }
            };
            edges.insert(from, edge);
        }

        // Fan-out targets flow implicitly into their join; their own edge
        // registrations would be unreachable configuration.
        for target in &fan_targets {
            if edges.contains_key(target) {
                return Err(GraphBuildError::FanOutTargetEdge(target.clone()));
            }
        }
        for name in &order {
            if !edges.contains_key(name) && !fan_targets.contains(name) {
                return Err(GraphBuildError::MissingEdge(name.clone()));
            }
        }

        Self::check_disjoint_writes(&edges, &nodes)?;

        let graph = Graph {
            name: self.name,
            entry,
            nodes,
            edges,
            order,
        };
        graph.check_acyclic_outside_retries()?;
        graph.warn_unreachable();
        Ok(graph)
    }

    fn check_target(
        target: &RouteTarget,
        from: &str,
        known: &impl Fn(&str, String) -> Result<(), GraphBuildError>,
    ) -> Result<(), GraphBuildError> {
        match target {
            RouteTarget::Node(name) => known(name, format!("edge from '{from}'")),
            RouteTarget::Retry(edge) => {
                known(&edge.to, format!("retry from '{from}'"))?;
                known(&edge.on_exhausted, format!("retry fallback from '{from}'"))
            }
            RouteTarget::End => Ok(()),
        }
    }

    fn check_disjoint_writes(
        edges: &HashMap<String, Edge<S>>,
        nodes: &HashMap<String, SharedNode<S>>,
    ) -> Result<(), GraphBuildError> {
        for edge in edges.values() {
            let Edge::FanOut { targets, .. } = edge else {
                continue;
            };
            let mut writers: HashMap<&'static str, &str> = HashMap::new();
            for target in targets {
                // Targets were validated to exist above.
                let Some(node) = nodes.get(target) else {
                    continue;
                };
                for &field in node.writes() {
                    if let Some(first) = writers.insert(field, target) {
                        return Err(GraphBuildError::OverlappingWrites {
                            first: first.to_string(),
                            second: target.clone(),
                            field,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Immutable, validated workflow graph.
///
/// Built once per agent at process start and shared read-only across
/// concurrent invocations; per-invocation data lives entirely in the state
/// record the executor threads through it.
pub struct Graph<S: GraphState> {
    name: String,
    entry: String,
    nodes: HashMap<String, SharedNode<S>>,
    edges: HashMap<String, Edge<S>>,
    order: Vec<String>,
}

impl<S: GraphState> Graph<S> {
    /// Start a builder for a named graph.
    pub fn builder(name: impl Into<String>) -> GraphBuilder<S> {
        GraphBuilder::new(name)
    }

    /// The graph's name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The designated entry node.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Node names in registration order.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Option<&SharedNode<S>> {
        self.nodes.get(name)
    }

    /// Look up a node's outgoing edge. Fan-out targets have none; their
    /// successor is the implicit join.
    pub fn edge(&self, name: &str) -> Option<&Edge<S>> {
        self.edges.get(name)
    }

    /// Render the graph as a Mermaid flowchart.
    pub fn mermaid(&self) -> String {
        let mut out = String::from("graph TD\n");
        for name in &self.order {
            let Some(edge) = self.edges.get(name) else {
                continue;
            };
            match edge {
                Edge::Direct(target) => Self::mermaid_target(&mut out, name, None, target),
                Edge::Branch { table, .. } => {
                    let mut codes: Vec<_> = table.iter().collect();
                    codes.sort_by_key(|(code, _)| code.to_string());
                    for (code, target) in codes {
                        Self::mermaid_target(&mut out, name, Some(code), target);
                    }
                }
                Edge::FanOut { targets, join, .. } => {
                    for target in targets {
                        out.push_str(&format!("    {name} -.-> {target}\n"));
                        out.push_str(&format!("    {target} --> {join}\n"));
                    }
                }
            }
        }
        out
    }

    fn mermaid_target(out: &mut String, from: &str, code: Option<&RouteCode>, target: &RouteTarget) {
        let label = code
            .map(|c| format!("|{c}| "))
            .unwrap_or_else(|| " ".to_string());
        match target {
            RouteTarget::Node(to) => out.push_str(&format!("    {from} -->{label}{to}\n")),
            RouteTarget::End => out.push_str(&format!("    {from} -->{label}END\n")),
            RouteTarget::Retry(edge) => {
                out.push_str(&format!(
                    "    {from} -.->{label}{to}\n",
                    to = edge.to
                ));
                out.push_str(&format!(
                    "    {from} -->|exhausted ({limit})| {fallback}\n",
                    limit = edge.limit,
                    fallback = edge.on_exhausted
                ));
            }
        }
    }

    /// Forward successors of a node, with retry loop-backs excluded and
    /// retry fallbacks included.
    fn forward_successors(&self, name: &str) -> Vec<&str> {
        let mut next = Vec::new();
        let Some(edge) = self.edges.get(name) else {
            return next;
        };
        match edge {
            Edge::Direct(target) => Self::push_forward(&mut next, target),
            Edge::Branch { table, .. } => {
                for target in table.values() {
                    Self::push_forward(&mut next, target);
                }
            }
            Edge::FanOut { targets, join, .. } => {
                for target in targets {
                    next.push(target);
                }
                next.push(join);
            }
        }
        next
    }

    fn push_forward<'a>(next: &mut Vec<&'a str>, target: &'a RouteTarget) {
        match target {
            RouteTarget::Node(to) => next.push(to),
            RouteTarget::Retry(edge) => next.push(&edge.on_exhausted),
            RouteTarget::End => {}
        }
    }

    /// Cycles are only legal through retry edges; anything else would loop
    /// without a bound.
    fn check_acyclic_outside_retries(&self) -> Result<(), GraphBuildError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            InStack,
            Done,
        }

        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut stack: Vec<(&str, Vec<&str>)> = Vec::new();
        let mut path: Vec<&str> = Vec::new();

        for start in &self.order {
            if marks.contains_key(start.as_str()) {
                continue;
            }
            marks.insert(start.as_str(), Mark::InStack);
            path.push(start.as_str());
            stack.push((start.as_str(), self.forward_successors(start)));

            while let Some(frame) = stack.last_mut() {
                let Some(next) = frame.1.pop() else {
                    marks.insert(frame.0, Mark::Done);
                    path.pop();
                    stack.pop();
                    continue;
                };
                match marks.get(next).copied() {
                    Some(Mark::InStack) => {
                        let from = path.iter().position(|n| *n == next).unwrap_or(0);
                        let mut cycle: Vec<String> =
                            path[from..].iter().map(|n| n.to_string()).collect();
                        cycle.push(next.to_string());
                        return Err(GraphBuildError::UnboundedCycle { path: cycle });
                    }
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(next, Mark::InStack);
                        path.push(next);
                        let successors = self.forward_successors(next);
                        stack.push((next, successors));
                    }
                }
            }
        }
        Ok(())
    }

    fn warn_unreachable(&self) {
        let mut reachable: HashSet<&str> = HashSet::new();
        let mut queue = vec![self.entry.as_str()];
        while let Some(name) = queue.pop() {
            if !reachable.insert(name) {
                continue;
            }
            for next in self.forward_successors(name) {
                queue.push(next);
            }
            // Retry loop-backs also make nodes reachable.
            if let Some(Edge::Direct(RouteTarget::Retry(edge))) = self.edges.get(name) {
                queue.push(&edge.to);
            }
            if let Some(Edge::Branch { table, .. }) = self.edges.get(name) {
                for target in table.values() {
                    if let RouteTarget::Retry(edge) = target {
                        queue.push(&edge.to);
                    }
                }
            }
        }
        for name in &self.order {
            if !reachable.contains(name.as_str()) {
                tracing::warn!(graph = %self.name, node = %name, "node is unreachable from the entry point");
            }
        }
    }
}

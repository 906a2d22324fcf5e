//! Graph executor
//!
//! Walks a built graph edge by edge from its entry node: run the current
//! node, apply its update to the state record, then follow the node's edge
//! to find what runs next. Fan-out edges spawn their activated targets as
//! concurrent tasks behind a semaphore and rendezvous at the join node;
//! retry edges loop back under a per-invocation counter and divert to
//! their fallback once the cap is hit.
//!
//! The executor holds no per-invocation state, so one executor can serve
//! any number of concurrent invocations.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::EngineConfig;
use super::error::ExecutionError;
use crate::graph::builder::{Edge, Graph};
use crate::graph::node::NodeError;
use crate::graph::routing::RouteTarget;
use crate::graph::state::{GraphState, StateUpdate};

/// Result of a completed invocation.
#[derive(Debug, Clone)]
pub struct RunOutcome<S: GraphState> {
    /// Final state after the terminal node.
    pub state: S,
    /// Number of node executions performed.
    pub steps: usize,
    /// Branch nodes whose retry cap was hit; the invocation still
    /// completed through their fallback routes.
    pub exhausted: Vec<String>,
}

impl<S: GraphState> RunOutcome<S> {
    /// Whether any retry loop ran out of budget along the way.
    pub fn retries_exhausted(&self) -> bool {
        !self.exhausted.is_empty()
    }
}

/// Where the walk goes after resolving a route target.
enum Step {
    Goto(String),
    Finish,
}

/// Executes invocations of a built graph.
pub struct Executor<S: GraphState> {
    graph: Graph<S>,
    config: EngineConfig,
}

impl<S: GraphState> Executor<S> {
    /// Create an executor with default configuration.
    pub fn new(graph: Graph<S>) -> Self {
        Self::with_config(graph, EngineConfig::default())
    }

    /// Create an executor with custom configuration.
    pub fn with_config(graph: Graph<S>, config: EngineConfig) -> Self {
        Self { graph, config }
    }

    /// The executed graph.
    pub fn graph(&self) -> &Graph<S> {
        &self.graph
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one invocation from the seed state to a terminal edge.
    ///
    /// Enforces the configured `graph_timeout` over the whole walk.
    pub async fn run(&self, seed: S) -> Result<RunOutcome<S>, ExecutionError> {
        self.run_cancellable(seed, CancellationToken::new()).await
    }

    /// Run one invocation that the caller can cancel.
    ///
    /// Cancellation is observed between nodes and while nodes are in
    /// flight; it surfaces as `ExecutionError::Cancelled`, distinct from
    /// node failure.
    pub async fn run_cancellable(
        &self,
        seed: S,
        cancel: CancellationToken,
    ) -> Result<RunOutcome<S>, ExecutionError> {
        let run_id = uuid::Uuid::new_v4();
        info!(
            graph = %self.graph.name(),
            run_id = %run_id,
            entry = %self.graph.entry(),
            "starting invocation"
        );

        let graph_timeout = self.config.graph_timeout;
        let result = match timeout(graph_timeout, self.run_inner(seed, &cancel)).await {
            Ok(result) => result,
            Err(_) => Err(ExecutionError::GraphTimeout(graph_timeout)),
        };

        match &result {
            Ok(outcome) => info!(
                graph = %self.graph.name(),
                run_id = %run_id,
                steps = outcome.steps,
                exhausted = outcome.exhausted.len(),
                "invocation completed"
            ),
            Err(err) => warn!(
                graph = %self.graph.name(),
                run_id = %run_id,
                error = %err,
                "invocation failed"
            ),
        }
        result
    }

    async fn run_inner(
        &self,
        seed: S,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome<S>, ExecutionError> {
        let mut state = seed;
        let mut current = self.graph.entry().to_string();
        let mut steps = 0usize;
        let mut retries: HashMap<String, u32> = HashMap::new();
        let mut exhausted: Vec<String> = Vec::new();

        loop {
            if cancel.is_cancelled() {
                return Err(ExecutionError::Cancelled);
            }
            if steps >= self.config.max_steps {
                return Err(ExecutionError::StepLimit(self.config.max_steps));
            }

            let update = self.run_node(&current, &state, cancel).await?;
            steps += 1;
            state = state.apply_update(update);

            let Some(edge) = self.graph.edge(&current) else {
                // The build guarantees an edge for every walkable node;
                // fan-out targets never become `current`.
                return Err(ExecutionError::node(
                    current.as_str(),
                    NodeError::new("node has no outgoing edge"),
                ));
            };

            let next = match edge {
                Edge::Direct(target) => {
                    self.resolve(&current, target, &mut retries, &mut exhausted)
                }
                Edge::Branch { decision, table } => {
                    let code = decision.decide(&state);
                    if self.config.tracing_enabled {
                        debug!(graph = %self.graph.name(), node = %current, code = %code, "routing decision");
                    }
                    let Some(target) = table.get(&code) else {
                        return Err(ExecutionError::unrouted(current.as_str(), code));
                    };
                    self.resolve(&current, target, &mut retries, &mut exhausted)
                }
                Edge::FanOut {
                    selector,
                    targets,
                    join,
                } => {
                    let requested = selector.select(&state);
                    for name in &requested {
                        if !targets.iter().any(|t| t == name) {
                            return Err(ExecutionError::unknown_activation(
                                current.as_str(),
                                name.as_str(),
                            ));
                        }
                    }
                    // Run in declared target order so merge order is a
                    // property of the graph, not of task scheduling.
                    let active: Vec<&String> = targets
                        .iter()
                        .filter(|t| requested.iter().any(|r| r == *t))
                        .collect();
                    if self.config.tracing_enabled {
                        debug!(
                            graph = %self.graph.name(),
                            node = %current,
                            activated = active.len(),
                            declared = targets.len(),
                            "fan-out"
                        );
                    }
                    if !active.is_empty() {
                        let updates = self.run_parallel(&current, &active, &state, cancel).await?;
                        steps += updates.len();
                        // Branch executions count against the budget too,
                        // so a wide fan-out cannot slip past the cap.
                        if steps > self.config.max_steps {
                            return Err(ExecutionError::StepLimit(self.config.max_steps));
                        }
                        state = state.apply_updates(updates);
                    }
                    Step::Goto(join.clone())
                }
            };

            match next {
                Step::Goto(name) => current = name,
                Step::Finish => {
                    return Ok(RunOutcome {
                        state,
                        steps,
                        exhausted,
                    });
                }
            }
        }
    }

    /// Follow a route target, counting retry traversals against their cap.
    fn resolve(
        &self,
        from: &str,
        target: &RouteTarget,
        retries: &mut HashMap<String, u32>,
        exhausted: &mut Vec<String>,
    ) -> Step {
        match target {
            RouteTarget::End => Step::Finish,
            RouteTarget::Node(name) => Step::Goto(name.clone()),
            RouteTarget::Retry(edge) => {
                let count = retries.entry(from.to_string()).or_insert(0);
                if *count < edge.limit {
                    *count += 1;
                    if self.config.tracing_enabled {
                        debug!(
                            graph = %self.graph.name(),
                            node = from,
                            attempt = *count,
                            limit = edge.limit,
                            target = %edge.to,
                            "retrying"
                        );
                    }
                    Step::Goto(edge.to.clone())
                } else {
                    warn!(
                        graph = %self.graph.name(),
                        node = from,
                        limit = edge.limit,
                        fallback = %edge.on_exhausted,
                        "retry budget exhausted"
                    );
                    exhausted.push(from.to_string());
                    Step::Goto(edge.on_exhausted.clone())
                }
            }
        }
    }

    /// Run a single node under its deadline, racing the cancel token.
    async fn run_node(
        &self,
        name: &str,
        state: &S,
        cancel: &CancellationToken,
    ) -> Result<S::Update, ExecutionError> {
        let Some(node) = self.graph.node(name) else {
            return Err(ExecutionError::node(
                name,
                NodeError::new("node not registered"),
            ));
        };
        let deadline = node.timeout().unwrap_or(self.config.node_timeout);
        if self.config.tracing_enabled {
            debug!(graph = %self.graph.name(), node = name, "running node");
        }

        tokio::select! {
            _ = cancel.cancelled() => Err(ExecutionError::Cancelled),
            result = timeout(deadline, node.run(state)) => match result {
                Ok(Ok(update)) => Ok(update),
                Ok(Err(err)) => Err(ExecutionError::node(name, err)),
                Err(_) => Err(ExecutionError::node_timeout(name, deadline)),
            },
        }
    }

    /// Run activated fan-out targets concurrently and collect their
    /// updates in declared order.
    ///
    /// The join barrier settles every branch before reporting: external
    /// cancellation wins over branch errors, and otherwise the first
    /// failing branch in declared order decides the outcome.
    async fn run_parallel(
        &self,
        from: &str,
        active: &[&String],
        state: &S,
        cancel: &CancellationToken,
    ) -> Result<Vec<S::Update>, ExecutionError> {
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism));
        let branch_cancel = cancel.child_token();
        let mut handles = Vec::with_capacity(active.len());

        for target in active {
            let name = (*target).clone();
            let Some(node) = self.graph.node(&name) else {
                branch_cancel.cancel();
                return Err(ExecutionError::node(
                    name.as_str(),
                    NodeError::new("node not registered"),
                ));
            };
            let node = Arc::clone(node);
            let state_clone = state.clone();
            let sem_clone = Arc::clone(&semaphore);
            let token = branch_cancel.clone();
            let deadline = node.timeout().unwrap_or(self.config.node_timeout);
            let task_name = name.clone();

            let handle = tokio::spawn(async move {
                let _permit = match sem_clone.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return Err(ExecutionError::Cancelled),
                };
                tokio::select! {
                    _ = token.cancelled() => Err(ExecutionError::Cancelled),
                    result = timeout(deadline, node.run(&state_clone)) => match result {
                        Ok(Ok(update)) => Ok(update),
                        Ok(Err(err)) => Err(ExecutionError::node(task_name.as_str(), err)),
                        Err(_) => Err(ExecutionError::node_timeout(task_name.as_str(), deadline)),
                    },
                }
            });
            handles.push((name, handle));
        }

        let mut merged: Vec<(String, S::Update)> = Vec::with_capacity(handles.len());
        let mut failure: Option<ExecutionError> = None;
        for (name, handle) in handles {
            match handle.await {
                Ok(Ok(update)) => merged.push((name, update)),
                Ok(Err(err)) => {
                    let replace = match &failure {
                        None => true,
                        Some(existing) => existing.is_cancelled() && !err.is_cancelled(),
                    };
                    if replace {
                        failure = Some(err);
                    }
                }
                Err(join_err) => {
                    branch_cancel.cancel();
                    return Err(ExecutionError::node(
                        name.as_str(),
                        NodeError::with_source(
                            "branch task panicked or was aborted",
                            std::io::Error::other(join_err.to_string()),
                        ),
                    ));
                }
            }
        }

        if cancel.is_cancelled() {
            return Err(ExecutionError::Cancelled);
        }
        if let Some(err) = failure {
            return Err(err);
        }

        // Past the static `writes()` check: catch branches that wrote the
        // same field at runtime instead of silently losing one update.
        let mut writers: HashMap<&'static str, &str> = HashMap::new();
        for (name, update) in &merged {
            for field in update.fields() {
                if let Some(first) = writers.insert(field, name.as_str()) {
                    return Err(ExecutionError::FieldCollision {
                        field,
                        first: first.to_string(),
                        second: name.clone(),
                    });
                }
            }
        }

        if self.config.tracing_enabled {
            debug!(graph = %self.graph.name(), node = from, branches = merged.len(), "fan-out settled");
        }
        Ok(merged.into_iter().map(|(_, update)| update).collect())
    }
}

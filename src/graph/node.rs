//! Node trait — the unit of work in a workflow graph
//!
//! A node reads the current state and returns a partial update. Nodes are
//! registered under a graph-local name by the builder; the structs themselves
//! carry no identity, so one implementation can serve several graphs. Shared
//! external resources (a problem bank, a model client) enter through the
//! node's constructor and are captured in its fields.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::state::GraphState;

/// Failure of a single node invocation.
///
/// A node error aborts the whole invocation; the executor wraps it with the
/// node's name. Collaborator errors convert into this via `From`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct NodeError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl NodeError {
    /// Create an error with a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// A precondition on the incoming state was unmet.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::new(format!("precondition unmet: {}", message.into()))
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A named unit of work.
///
/// `run` receives a read-only view of the state and produces the update to
/// merge. An empty update is a legitimate result, not an error. Nodes used
/// as fan-out targets must declare the state fields they write via
/// `writes()` so the builder can verify siblings stay disjoint.
#[async_trait]
pub trait Node<S: GraphState>: Send + Sync {
    /// Execute the node against the current state.
    async fn run(&self, state: &S) -> Result<S::Update, NodeError>;

    /// State fields this node writes. Empty means "writes nothing", which
    /// is taken literally when the node is a fan-out target.
    fn writes(&self) -> &'static [&'static str] {
        &[]
    }

    /// Per-node deadline override. `None` uses the engine's default.
    fn timeout(&self) -> Option<Duration> {
        None
    }
}

/// Shared handle to a node, as stored in a built graph.
pub type SharedNode<S> = Arc<dyn Node<S>>;

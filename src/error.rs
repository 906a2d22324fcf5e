//! Crate-level error type

use thiserror::Error;

use crate::engine::ExecutionError;
use crate::graph::GraphBuildError;

/// Everything that can go wrong building or running a tutoring agent.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A graph failed validation at construction.
    #[error("graph construction failed: {0}")]
    Build(#[from] GraphBuildError),

    /// A graph invocation failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

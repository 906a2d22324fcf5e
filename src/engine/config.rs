//! Execution engine configuration
//!
//! Limits and timeouts for graph invocations: step budget, fan-out
//! parallelism, and per-node plus whole-run deadlines.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Engine configuration shared by all invocations of an executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum node executions per invocation before forced termination.
    /// A backstop on top of per-edge retry limits.
    pub max_steps: usize,

    /// Maximum concurrent node executions during a fan-out.
    pub parallelism: usize,

    /// Deadline for a single node execution. Nodes may override it via
    /// `Node::timeout`.
    #[serde(with = "humantime_serde")]
    pub node_timeout: Duration,

    /// Deadline for an entire invocation.
    #[serde(with = "humantime_serde")]
    pub graph_timeout: Duration,

    /// Emit per-node tracing spans and step logs.
    pub tracing_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: 100,
            parallelism: num_cpus::get(),
            node_timeout: Duration::from_secs(120),
            graph_timeout: Duration::from_secs(600),
            tracing_enabled: true,
        }
    }
}

impl EngineConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the step budget.
    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max;
        self
    }

    /// Set fan-out parallelism.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Set the per-node deadline.
    pub fn with_node_timeout(mut self, timeout: Duration) -> Self {
        self.node_timeout = timeout;
        self
    }

    /// Set the whole-invocation deadline.
    pub fn with_graph_timeout(mut self, timeout: Duration) -> Self {
        self.graph_timeout = timeout;
        self
    }

    /// Enable or disable per-step tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing_enabled = enabled;
        self
    }
}

//! Error types for the execution engine
//!
//! Runtime failures of a graph invocation. Configuration mistakes are
//! caught earlier, at build time, by `GraphBuildError`.

use std::time::Duration;

use thiserror::Error;

use crate::graph::node::NodeError;
use crate::graph::routing::RouteCode;

/// Errors that can occur while executing a graph invocation.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A node returned an error.
    #[error("node '{node}' failed: {source}")]
    Node {
        node: String,
        #[source]
        source: NodeError,
    },

    /// A node exceeded its deadline.
    #[error("node '{node}' timed out after {deadline:?}")]
    NodeTimeout { node: String, deadline: Duration },

    /// The whole invocation exceeded its deadline.
    #[error("invocation timed out after {0:?}")]
    GraphTimeout(Duration),

    /// A decision produced a code outside its declared domain. The build
    /// checks the table against the declaration, so this only fires when a
    /// decision function breaks its own contract.
    #[error("decision at '{node}' produced unmapped code {code}")]
    UnroutedCode { node: String, code: RouteCode },

    /// A fan-out selector activated a name missing from its declared
    /// target list.
    #[error("selector at '{node}' activated undeclared target '{target}'")]
    UnknownActivation { node: String, target: String },

    /// Two fan-out branches wrote the same field at runtime, past the
    /// static `writes()` declarations.
    #[error("fan-out branches '{first}' and '{second}' both wrote field '{field}'")]
    FieldCollision {
        field: &'static str,
        first: String,
        second: String,
    },

    /// Step budget exhausted before reaching `END`.
    #[error("step limit exceeded: {0}")]
    StepLimit(usize),

    /// Invocation cancelled by the caller.
    #[error("invocation cancelled")]
    Cancelled,
}

impl ExecutionError {
    /// Wrap a node failure with the node's graph-local name.
    pub fn node(node: impl Into<String>, source: NodeError) -> Self {
        Self::Node {
            node: node.into(),
            source,
        }
    }

    /// Create a node timeout error.
    pub fn node_timeout(node: impl Into<String>, deadline: Duration) -> Self {
        Self::NodeTimeout {
            node: node.into(),
            deadline,
        }
    }

    /// Create an unmapped-code error.
    pub fn unrouted(node: impl Into<String>, code: RouteCode) -> Self {
        Self::UnroutedCode {
            node: node.into(),
            code,
        }
    }

    /// Create an undeclared-activation error.
    pub fn unknown_activation(node: impl Into<String>, target: impl Into<String>) -> Self {
        Self::UnknownActivation {
            node: node.into(),
            target: target.into(),
        }
    }

    /// Check if the error is a deadline expiry (node or invocation).
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::NodeTimeout { .. } | Self::GraphTimeout(_))
    }

    /// Check if the invocation was cancelled rather than failed.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    // Ensure errors are Send + Sync (compile-time check)
    static_assertions::assert_impl_all!(super::ExecutionError: Send, Sync);
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExecutionError::StepLimit(100);
        assert_eq!(format!("{}", err), "step limit exceeded: 100");
    }

    #[test]
    fn test_node_error_carries_source() {
        let err = ExecutionError::node("classify", NodeError::new("model unavailable"));
        match err {
            ExecutionError::Node { node, source } => {
                assert_eq!(node, "classify");
                assert_eq!(source.message(), "model unavailable");
            }
            _ => panic!("wrong error type"),
        }
    }

    #[test]
    fn test_unrouted_code_display() {
        let err = ExecutionError::unrouted("classify", RouteCode::Int(42));
        assert!(format!("{}", err).contains("42"));
        assert!(format!("{}", err).contains("classify"));
    }

    #[test]
    fn test_is_timeout() {
        assert!(ExecutionError::node_timeout("slow", Duration::from_secs(1)).is_timeout());
        assert!(ExecutionError::GraphTimeout(Duration::from_secs(1)).is_timeout());
        assert!(!ExecutionError::Cancelled.is_timeout());
    }

    #[test]
    fn test_is_cancelled() {
        assert!(ExecutionError::Cancelled.is_cancelled());
        assert!(!ExecutionError::StepLimit(5).is_cancelled());
    }

    #[test]
    fn test_errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ExecutionError>();
    }
}

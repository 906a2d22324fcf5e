//! Workflow graph model
//!
//! A graph is a set of named async nodes wired by edges: unconditional,
//! conditional on a routing code, or fanning out to concurrent targets
//! that rendezvous at a join node. State flows through as an immutable
//! record; nodes return typed updates rather than mutating shared data.

pub mod builder;
pub mod node;
pub mod routing;
pub mod state;

pub use builder::{Edge, Graph, GraphBuildError, GraphBuilder};
pub use node::{Node, NodeError, SharedNode};
pub use routing::{Decision, RetryEdge, RouteCode, RouteTable, RouteTarget, Selector, DEFAULT_RETRY_LIMIT, END};
pub use state::{GraphState, StateUpdate};

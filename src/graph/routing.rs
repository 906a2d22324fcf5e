//! Routing codes, targets, and decision functions
//!
//! Conditional edges pair a decision function with a lookup table from
//! routing code to successor. The decision declares its full code domain up
//! front so the builder can verify the table covers it exactly — an unmapped
//! code is a configuration error at build time, not a surprise at run time.
//! Two sentinel targets exist besides named successors: `END` terminates the
//! invocation, and a retry edge loops back to an earlier node under a
//! first-class iteration cap.

use std::fmt;
use std::sync::Arc;

use super::state::GraphState;

/// Terminal marker accepted wherever a successor name is expected.
pub const END: &str = "END";

/// Default iteration cap for retry edges.
pub const DEFAULT_RETRY_LIMIT: u32 = 10;

/// A discrete routing code produced by a decision function.
///
/// Codes keep the wire values of the systems they dispatch for (integer
/// request kinds, classifier verdicts, boolean gates), so logs line up with
/// upstream services.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteCode {
    /// Integer code, e.g. a request-kind or classifier verdict.
    Int(i64),
    /// Symbolic code.
    Text(String),
    /// Boolean gate outcome.
    Flag(bool),
}

impl fmt::Display for RouteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(code) => write!(f, "{code}"),
            Self::Text(code) => write!(f, "{code}"),
            Self::Flag(code) => write!(f, "{code}"),
        }
    }
}

impl From<i64> for RouteCode {
    fn from(code: i64) -> Self {
        Self::Int(code)
    }
}

impl From<i32> for RouteCode {
    fn from(code: i32) -> Self {
        Self::Int(code as i64)
    }
}

impl From<bool> for RouteCode {
    fn from(code: bool) -> Self {
        Self::Flag(code)
    }
}

impl From<&str> for RouteCode {
    fn from(code: &str) -> Self {
        Self::Text(code.to_string())
    }
}

impl From<String> for RouteCode {
    fn from(code: String) -> Self {
        Self::Text(code)
    }
}

/// A cycle edge back to an earlier node, bounded by an iteration cap.
///
/// On exhaustion the executor diverts to `on_exhausted` with the state as it
/// stands instead of failing the invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryEdge {
    /// Node to loop back to.
    pub to: String,
    /// Maximum number of times the loop may be re-entered.
    pub limit: u32,
    /// Fallback successor once the cap is hit.
    pub on_exhausted: String,
}

impl RetryEdge {
    /// Create a retry edge with the default cap.
    pub fn new(to: impl Into<String>, on_exhausted: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            limit: DEFAULT_RETRY_LIMIT,
            on_exhausted: on_exhausted.into(),
        }
    }

    /// Override the iteration cap.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// Where an edge leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    /// A named successor node.
    Node(String),
    /// Loop back under a bounded retry edge.
    Retry(RetryEdge),
    /// Terminate the invocation and return the accumulated state.
    End,
}

impl RouteTarget {
    /// Named successor, or `End` for the `END` marker.
    pub fn node(name: impl Into<String>) -> Self {
        let name = name.into();
        if name == END {
            Self::End
        } else {
            Self::Node(name)
        }
    }
}

impl From<&str> for RouteTarget {
    fn from(name: &str) -> Self {
        Self::node(name)
    }
}

impl From<String> for RouteTarget {
    fn from(name: String) -> Self {
        Self::node(name)
    }
}

impl From<RetryEdge> for RouteTarget {
    fn from(edge: RetryEdge) -> Self {
        Self::Retry(edge)
    }
}

/// A decision function with its declared code domain.
///
/// The closure inspects post-update state and returns one code. The declared
/// domain is what the builder validates the route table against; a code
/// outside it returned at run time is reported as an execution error.
#[derive(Clone)]
pub struct Decision<S> {
    codes: Vec<RouteCode>,
    decide: Arc<dyn Fn(&S) -> RouteCode + Send + Sync>,
}

impl<S: GraphState> Decision<S> {
    /// Declare a decision over the given code domain.
    pub fn new<I, C, F>(codes: I, decide: F) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<RouteCode>,
        F: Fn(&S) -> RouteCode + Send + Sync + 'static,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
            decide: Arc::new(decide),
        }
    }

    /// The declared code domain.
    pub fn codes(&self) -> &[RouteCode] {
        &self.codes
    }

    /// Evaluate the decision against the current state.
    pub fn decide(&self, state: &S) -> RouteCode {
        (self.decide)(state)
    }
}

impl<S> fmt::Debug for Decision<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decision").field("codes", &self.codes).finish()
    }
}

/// Lookup table from routing code to target, built by chaining `on`.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<(RouteCode, RouteTarget)>,
}

impl RouteTable {
    /// Start an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a code to a target. Duplicate codes are rejected at build time.
    pub fn on(mut self, code: impl Into<RouteCode>, target: impl Into<RouteTarget>) -> Self {
        self.entries.push((code.into(), target.into()));
        self
    }

    /// The table entries in registration order.
    pub fn entries(&self) -> &[(RouteCode, RouteTarget)] {
        &self.entries
    }

    pub(crate) fn into_entries(self) -> Vec<(RouteCode, RouteTarget)> {
        self.entries
    }
}

/// Fan-out activation selector: returns the node names to run concurrently.
///
/// The returned set must be a subset of the fan-out edge's declared targets;
/// an empty set proceeds straight to the join node.
#[derive(Clone)]
pub struct Selector<S> {
    select: Arc<dyn Fn(&S) -> Vec<String> + Send + Sync>,
}

impl<S: GraphState> Selector<S> {
    /// Wrap an activation function.
    pub fn new<F>(select: F) -> Self
    where
        F: Fn(&S) -> Vec<String> + Send + Sync + 'static,
    {
        Self {
            select: Arc::new(select),
        }
    }

    /// Evaluate the selector against the current state.
    pub fn select(&self, state: &S) -> Vec<String> {
        (self.select)(state)
    }
}

impl<S> fmt::Debug for Selector<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Selector")
    }
}

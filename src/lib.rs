//! tutor-agents: workflow-graph agents for a K-12 math tutoring pipeline
//!
//! A small graph engine plus the three agents the tutoring flow needs:
//!
//! - [`QuestionAgent`]: draws bank questions or generates variants from
//!   a checked sample, redrawing rejected samples under a bounded retry
//! - [`TopicAgent`]: resolves which curriculum unit an upload belongs
//!   to, or rejects it as non-math material
//! - [`HintAgent`]: explains a section and fans out to diagram and
//!   formula hints as the section catalog dictates
//!
//! The engine executes typed-state graphs: nodes return partial updates,
//! conditional routing is exhaustive over declared codes, cycles must
//! carry a retry cap, and fan-out branches run concurrently off the same
//! snapshot with disjoint writes that merge at the join. Miswired graphs
//! fail when they are built, not mid-run.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tutor_agents::{GenerationHints, QuestionAgent, QuestionRequest};
//! use tutor_agents::providers::{MemoryBank, OfflineClassifier, OfflineGenerator};
//!
//! let agent = QuestionAgent::new(
//!     Arc::new(MemoryBank::from_jsonl("bank.jsonl")?),
//!     Arc::new(OfflineClassifier::new()),
//!     Arc::new(OfflineGenerator::new()),
//!     GenerationHints::new(),
//! )?;
//! let report = agent.run(QuestionRequest::generate("Multiplication", 4)).await?;
//! println!("{}", report.questions.join("\n"));
//! ```

pub mod agents;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod providers;
pub mod service;
pub mod text;

// Engine and graph re-exports
pub use engine::{EngineConfig, ExecutionError, Executor, RunOutcome};
pub use graph::{
    Decision, Edge, Graph, GraphBuildError, GraphBuilder, GraphState, Node, NodeError, RetryEdge,
    RouteCode, RouteTable, RouteTarget, Selector, SharedNode, StateUpdate, DEFAULT_RETRY_LIMIT,
    END,
};

// Agent re-exports
pub use agents::{
    GenerationHints, HintAgent, HintReport, QuestionAgent, QuestionReport, QuestionRequest,
    RequestKind, SampleCheck, TopicAgent, TopicReport, DEFAULT_QUESTION_COUNT, INVALID_UNIT,
};

// Service-level re-exports
pub use config::AppConfig;
pub use error::AgentError;
pub use service::{AssistOutcome, TutorService};

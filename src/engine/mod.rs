//! Execution engine
//!
//! Drives invocations of a built graph: sequential edge walking, bounded
//! retry loops, concurrent fan-out with a join barrier, per-node and
//! whole-run deadlines, and caller-driven cancellation.

pub mod config;
pub mod error;
pub mod executor;

pub use config::EngineConfig;
pub use error::ExecutionError;
pub use executor::{Executor, RunOutcome};

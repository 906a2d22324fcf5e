//! Topic agent
//!
//! Resolves which curriculum unit an uploaded worksheet belongs to. Two
//! recognition passes are reconciled into one transcript; a relevance
//! gate then either summarizes and matches it against the unit list or
//! ends the run with the [`INVALID_UNIT`] sentinel when the upload is
//! not math material at all.

mod nodes;
mod state;

pub use state::{TopicState, TopicUpdate, INVALID_UNIT};

use std::sync::Arc;

use serde::Serialize;

use crate::engine::{EngineConfig, ExecutionError, Executor, RunOutcome};
use crate::graph::{Decision, Graph, GraphBuildError, RouteCode, RouteTable, END};
use crate::providers::TranscriptModel;

use nodes::{EndWithWarning, MergePasses, SelectUnit, Summarize};

/// What one topic run produced.
#[derive(Debug, Clone, Serialize)]
pub struct TopicReport {
    /// Resolved curriculum unit, or [`INVALID_UNIT`].
    pub unit: String,
    /// Transcript summary; empty on the invalid path.
    pub summary: String,
    /// Why the upload was rejected, when it was.
    pub warning: Option<String>,
    /// Node executions the run took.
    pub steps: usize,
}

impl TopicReport {
    /// Whether the upload mapped to a real unit.
    pub fn is_valid(&self) -> bool {
        self.unit != INVALID_UNIT
    }

    fn from_outcome(outcome: RunOutcome<TopicState>) -> Self {
        let state = outcome.state;
        Self {
            unit: state.unit,
            summary: state.summary,
            warning: state.warning,
            steps: outcome.steps,
        }
    }
}

/// The topic agent: a built graph plus the engine that runs it.
pub struct TopicAgent {
    executor: Executor<TopicState>,
}

impl TopicAgent {
    pub fn new(
        model: Arc<dyn TranscriptModel>,
        units: Vec<String>,
    ) -> Result<Self, GraphBuildError> {
        Self::with_config(model, units, EngineConfig::default())
    }

    /// Build with explicit engine settings.
    pub fn with_config(
        model: Arc<dyn TranscriptModel>,
        units: Vec<String>,
        config: EngineConfig,
    ) -> Result<Self, GraphBuildError> {
        let graph = build_graph(model, units)?;
        Ok(Self {
            executor: Executor::with_config(graph, config),
        })
    }

    /// The underlying graph, e.g. for rendering.
    pub fn graph(&self) -> &Graph<TopicState> {
        self.executor.graph()
    }

    /// Resolve the unit for one upload's recognition passes.
    pub async fn run(
        &self,
        first_pass: &str,
        second_pass: &str,
    ) -> Result<TopicReport, ExecutionError> {
        let seed = TopicState::upload(first_pass, second_pass);
        let outcome = self.executor.run(seed).await?;
        Ok(TopicReport::from_outcome(outcome))
    }
}

fn build_graph(
    model: Arc<dyn TranscriptModel>,
    units: Vec<String>,
) -> Result<Graph<TopicState>, GraphBuildError> {
    Graph::builder("topic_agent")
        .node("merge_passes", MergePasses::new(Arc::clone(&model)))
        .node("summarize", Summarize::new(Arc::clone(&model), units.clone()))
        .node("select_unit", SelectUnit::new(model, units))
        .node("end_with_warning", EndWithWarning)
        .entry("merge_passes")
        .branch(
            "merge_passes",
            Decision::new([true, false], |state: &TopicState| {
                RouteCode::Flag(state.math_related)
            }),
            RouteTable::new()
                .on(true, "summarize")
                .on(false, "end_with_warning"),
        )
        .edge("summarize", "select_unit")
        .edge("select_unit", END)
        .edge("end_with_warning", END)
        .build()
}

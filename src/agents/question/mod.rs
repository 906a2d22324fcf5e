//! Question agent
//!
//! Serves two request kinds for a topic: drawing existing bank questions
//! as they are, and generating fresh variants from a bank sample that
//! first has to pass a fitness check. Rejected samples are excluded and
//! redrawn under a bounded retry; running out of redraws or samples
//! yields an explicit empty list rather than an error.

mod nodes;
mod state;

pub use nodes::{GenerationHints, DEFAULT_QUESTION_COUNT};
pub use state::{QuestionState, QuestionUpdate, RequestKind, SampleCheck};

use std::sync::Arc;

use serde::Serialize;

use crate::engine::{EngineConfig, ExecutionError, Executor, RunOutcome};
use crate::graph::{
    Decision, Graph, GraphBuildError, RetryEdge, RouteTable, DEFAULT_RETRY_LIMIT, END,
};
use crate::providers::{ProblemBank, QuestionGenerator, SampleClassifier, SampleQuestion};

use nodes::{
    AcceptRequest, CheckSample, DrawRandomQuestions, DrawSample, GenerateQuestions, Respond,
};

/// One question request.
#[derive(Debug, Clone)]
pub struct QuestionRequest {
    pub topic: String,
    pub kind: RequestKind,
    /// Questions wanted; zero means "use the default".
    pub count: usize,
}

impl QuestionRequest {
    pub fn random(topic: impl Into<String>, count: usize) -> Self {
        Self {
            topic: topic.into(),
            kind: RequestKind::Random,
            count,
        }
    }

    pub fn generate(topic: impl Into<String>, count: usize) -> Self {
        Self {
            topic: topic.into(),
            kind: RequestKind::Generate,
            count,
        }
    }
}

/// What one question run produced.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionReport {
    /// The questions, possibly empty.
    pub questions: Vec<String>,
    /// The approved sample generation was seeded from, if any.
    pub sample: Option<SampleQuestion>,
    /// Whether the sample redraw budget ran out.
    pub exhausted: bool,
    /// Node executions the run took.
    pub steps: usize,
}

impl QuestionReport {
    fn from_outcome(outcome: RunOutcome<QuestionState>) -> Self {
        let exhausted = outcome.retries_exhausted();
        let state = outcome.state;
        let sample = if state.check == SampleCheck::Approved {
            state.sample
        } else {
            None
        };
        Self {
            questions: state.questions,
            sample,
            exhausted,
            steps: outcome.steps,
        }
    }
}

/// The question agent: a built graph plus the engine that runs it.
///
/// All collaborators are injected at construction; the graph is
/// validated once, up front, and every miswiring surfaces here instead
/// of mid-run.
pub struct QuestionAgent {
    executor: Executor<QuestionState>,
}

impl QuestionAgent {
    pub fn new(
        bank: Arc<dyn ProblemBank>,
        classifier: Arc<dyn SampleClassifier>,
        generator: Arc<dyn QuestionGenerator>,
        hints: GenerationHints,
    ) -> Result<Self, GraphBuildError> {
        Self::with_config(
            bank,
            classifier,
            generator,
            hints,
            EngineConfig::default(),
            DEFAULT_RETRY_LIMIT,
        )
    }

    /// Build with explicit engine settings and redraw budget.
    pub fn with_config(
        bank: Arc<dyn ProblemBank>,
        classifier: Arc<dyn SampleClassifier>,
        generator: Arc<dyn QuestionGenerator>,
        hints: GenerationHints,
        config: EngineConfig,
        retry_limit: u32,
    ) -> Result<Self, GraphBuildError> {
        let graph = build_graph(bank, classifier, generator, hints, retry_limit)?;
        Ok(Self {
            executor: Executor::with_config(graph, config),
        })
    }

    /// The underlying graph, e.g. for rendering.
    pub fn graph(&self) -> &Graph<QuestionState> {
        self.executor.graph()
    }

    /// Serve one request.
    pub async fn run(&self, request: QuestionRequest) -> Result<QuestionReport, ExecutionError> {
        let seed = QuestionState::request(request.topic, request.kind, request.count);
        let outcome = self.executor.run(seed).await?;
        Ok(QuestionReport::from_outcome(outcome))
    }
}

fn build_graph(
    bank: Arc<dyn ProblemBank>,
    classifier: Arc<dyn SampleClassifier>,
    generator: Arc<dyn QuestionGenerator>,
    hints: GenerationHints,
    retry_limit: u32,
) -> Result<Graph<QuestionState>, GraphBuildError> {
    Graph::builder("question_agent")
        .node("accept_request", AcceptRequest)
        .node("draw_random", DrawRandomQuestions::new(Arc::clone(&bank)))
        .node("draw_sample", DrawSample::new(bank))
        .node("check_sample", CheckSample::new(classifier))
        .node("generate_questions", GenerateQuestions::new(generator, hints))
        .node("respond", Respond)
        .entry("accept_request")
        .branch(
            "accept_request",
            Decision::new(
                [RequestKind::Random, RequestKind::Generate],
                |state: &QuestionState| state.kind.into(),
            ),
            RouteTable::new()
                .on(RequestKind::Random, "draw_random")
                .on(RequestKind::Generate, "draw_sample"),
        )
        .edge("draw_random", "respond")
        .edge("draw_sample", "check_sample")
        .branch(
            "check_sample",
            Decision::new(
                [
                    SampleCheck::NoSample,
                    SampleCheck::Rejected,
                    SampleCheck::Approved,
                ],
                |state: &QuestionState| state.check.into(),
            ),
            RouteTable::new()
                .on(
                    SampleCheck::Rejected,
                    RetryEdge::new("draw_sample", "respond").with_limit(retry_limit),
                )
                .on(SampleCheck::Approved, "generate_questions")
                .on(SampleCheck::NoSample, "respond"),
        )
        .edge("generate_questions", "respond")
        .edge("respond", END)
        .build()
}

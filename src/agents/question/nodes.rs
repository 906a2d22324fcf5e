//! Question agent nodes

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::graph::state::StateUpdate;
use crate::graph::{Node, NodeError};
use crate::providers::{ProblemBank, QuestionGenerator, SampleClassifier, SampleQuestion};
use crate::text::insert_choice_breaks;

use super::state::{QuestionState, QuestionUpdate, RequestKind, SampleCheck};

/// Questions per request when the caller does not say.
pub const DEFAULT_QUESTION_COUNT: usize = 4;

/// Per-topic guidance handed to the generator, e.g. numeric constraints
/// the topic's questions must respect.
#[derive(Debug, Clone, Default)]
pub struct GenerationHints {
    hints: HashMap<String, String>,
}

impl GenerationHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach guidance for one topic.
    pub fn with_hint(mut self, topic: impl Into<String>, guidance: impl Into<String>) -> Self {
        self.hints.insert(topic.into(), guidance.into());
        self
    }

    /// Guidance for a topic, if any.
    pub fn get(&self, topic: &str) -> Option<&str> {
        self.hints.get(topic).map(String::as_str)
    }
}

/// Entry node: normalizes the requested count before routing.
pub struct AcceptRequest;

#[async_trait]
impl Node<QuestionState> for AcceptRequest {
    async fn run(&self, state: &QuestionState) -> Result<QuestionUpdate, NodeError> {
        if state.count == 0 {
            debug!(default = DEFAULT_QUESTION_COUNT, "count missing; using the default");
            return Ok(QuestionUpdate::count(DEFAULT_QUESTION_COUNT));
        }
        Ok(QuestionUpdate::count(state.count))
    }

    fn writes(&self) -> &'static [&'static str] {
        &["count"]
    }
}

/// Draws `count` distinct bank questions for the topic, as they are.
pub struct DrawRandomQuestions {
    bank: Arc<dyn ProblemBank>,
}

impl DrawRandomQuestions {
    pub fn new(bank: Arc<dyn ProblemBank>) -> Self {
        Self { bank }
    }
}

#[async_trait]
impl Node<QuestionState> for DrawRandomQuestions {
    async fn run(&self, state: &QuestionState) -> Result<QuestionUpdate, NodeError> {
        let pool = self.bank.entries(&state.topic);
        if pool.is_empty() {
            debug!(topic = %state.topic, "no bank questions for topic");
            return Ok(QuestionUpdate::questions(Vec::new()));
        }

        let wanted = state.count.min(pool.len());
        let mut picks: Vec<usize> = Vec::with_capacity(wanted);
        {
            let mut rng = rand::thread_rng();
            while picks.len() < wanted {
                let at = rng.gen_range(0..pool.len());
                if !picks.contains(&at) {
                    picks.push(at);
                }
            }
        }

        let questions = picks
            .into_iter()
            .map(|at| pool[at].question.clone())
            .collect();
        Ok(QuestionUpdate::questions(questions))
    }

    fn writes(&self) -> &'static [&'static str] {
        &["questions"]
    }
}

/// Draws one generation sample for the topic.
///
/// Diagram-bound entries cannot seed text-only generation and are
/// skipped, as are samples already rejected this invocation. An empty
/// eligible pool writes `None`, which the check node turns into the
/// no-sample route.
pub struct DrawSample {
    bank: Arc<dyn ProblemBank>,
}

impl DrawSample {
    pub fn new(bank: Arc<dyn ProblemBank>) -> Self {
        Self { bank }
    }
}

#[async_trait]
impl Node<QuestionState> for DrawSample {
    async fn run(&self, state: &QuestionState) -> Result<QuestionUpdate, NodeError> {
        let eligible: Vec<_> = self
            .bank
            .samples(&state.topic)
            .into_iter()
            .filter(|entry| !entry.has_diagram && !state.rejected.contains(&entry.id))
            .collect();

        let drawn = {
            let mut rng = rand::thread_rng();
            eligible.choose(&mut rng).cloned()
        };
        let Some(entry) = drawn else {
            debug!(
                topic = %state.topic,
                rejected = state.rejected.len(),
                "no eligible sample to draw"
            );
            return Ok(QuestionUpdate::sample(None));
        };

        let text = insert_choice_breaks(&entry.question);
        Ok(QuestionUpdate::sample(Some(SampleQuestion::from_entry(
            &entry, text,
        ))))
    }

    fn writes(&self) -> &'static [&'static str] {
        &["sample"]
    }
}

/// Checks whether the drawn sample can seed generation.
pub struct CheckSample {
    classifier: Arc<dyn SampleClassifier>,
}

impl CheckSample {
    pub fn new(classifier: Arc<dyn SampleClassifier>) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl Node<QuestionState> for CheckSample {
    async fn run(&self, state: &QuestionState) -> Result<QuestionUpdate, NodeError> {
        let Some(sample) = &state.sample else {
            debug!("no sample drawn; nothing to check");
            return Ok(QuestionUpdate::no_sample());
        };
        if self.classifier.classify(&sample.text).await? {
            Ok(QuestionUpdate::approved())
        } else {
            debug!(sample = sample.id, "sample rejected as a generation seed");
            Ok(QuestionUpdate::rejected(sample.id))
        }
    }

    fn writes(&self) -> &'static [&'static str] {
        &["check", "rejected"]
    }
}

/// Generates question variants from the approved sample.
pub struct GenerateQuestions {
    generator: Arc<dyn QuestionGenerator>,
    hints: GenerationHints,
}

impl GenerateQuestions {
    pub fn new(generator: Arc<dyn QuestionGenerator>, hints: GenerationHints) -> Self {
        Self { generator, hints }
    }
}

#[async_trait]
impl Node<QuestionState> for GenerateQuestions {
    async fn run(&self, state: &QuestionState) -> Result<QuestionUpdate, NodeError> {
        let Some(sample) = &state.sample else {
            return Err(NodeError::precondition("generation needs an approved sample"));
        };
        let questions = self
            .generator
            .generate(
                &state.topic,
                sample,
                state.count,
                self.hints.get(&state.topic),
            )
            .await?;
        Ok(QuestionUpdate::questions(questions))
    }

    fn writes(&self) -> &'static [&'static str] {
        &["questions"]
    }
}

/// Finalization node, also the landing spot when sample redraws run out.
///
/// A generate request that never reached generation hands back an
/// explicit empty list.
pub struct Respond;

#[async_trait]
impl Node<QuestionState> for Respond {
    async fn run(&self, state: &QuestionState) -> Result<QuestionUpdate, NodeError> {
        if state.kind == RequestKind::Generate && state.check != SampleCheck::Approved {
            return Ok(QuestionUpdate::questions(Vec::new()));
        }
        Ok(QuestionUpdate::empty())
    }

    fn writes(&self) -> &'static [&'static str] {
        &["questions"]
    }
}

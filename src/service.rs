//! Tutoring service facade
//!
//! Bundles the three agents behind the flow a tutoring request takes:
//! resolve the upload's curriculum unit first, then produce questions
//! and section hints for that unit concurrently.

use serde::Serialize;
use tracing::info;

use crate::agents::{
    HintAgent, HintReport, QuestionAgent, QuestionReport, QuestionRequest, RequestKind,
    TopicAgent,
};
use crate::error::AgentError;

/// Outcome of one assisted upload.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AssistOutcome {
    /// The upload was not math material; nothing was generated.
    Rejected {
        #[serde(skip_serializing_if = "Option::is_none")]
        warning: Option<String>,
    },
    /// The upload mapped to a unit and both pipelines ran.
    Tutored {
        unit: String,
        questions: QuestionReport,
        hints: HintReport,
    },
}

/// The three agents wired together.
pub struct TutorService {
    question: QuestionAgent,
    topic: TopicAgent,
    hints: HintAgent,
}

impl TutorService {
    pub fn new(question: QuestionAgent, topic: TopicAgent, hints: HintAgent) -> Self {
        Self {
            question,
            topic,
            hints,
        }
    }

    pub fn question(&self) -> &QuestionAgent {
        &self.question
    }

    pub fn topic(&self) -> &TopicAgent {
        &self.topic
    }

    pub fn hints(&self) -> &HintAgent {
        &self.hints
    }

    /// Handle one upload end to end.
    ///
    /// The resolved unit names both the question topic and the hint
    /// section, so the two downstream runs share it and run
    /// concurrently.
    pub async fn assist(
        &self,
        first_pass: &str,
        second_pass: &str,
        kind: RequestKind,
        count: usize,
    ) -> Result<AssistOutcome, AgentError> {
        let topic = self.topic.run(first_pass, second_pass).await?;
        if !topic.is_valid() {
            return Ok(AssistOutcome::Rejected {
                warning: topic.warning,
            });
        }

        info!(unit = %topic.unit, "upload resolved; producing questions and hints");
        let request = QuestionRequest {
            topic: topic.unit.clone(),
            kind,
            count,
        };
        let (questions, hints) =
            tokio::join!(self.question.run(request), self.hints.run(&topic.unit));
        Ok(AssistOutcome::Tutored {
            unit: topic.unit,
            questions: questions?,
            hints: hints?,
        })
    }
}

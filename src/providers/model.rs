//! Model-facing collaborator traits
//!
//! Abstractions over the inference backends the agents talk to. Each
//! trait covers one call site in the pipeline; implementations bridge to
//! real model servers, while `offline` provides deterministic versions.

use async_trait::async_trait;

use super::bank::SampleQuestion;
use super::ProviderError;

/// Decides whether a sample question's structure supports generating
/// number-swapped variants.
#[async_trait]
pub trait SampleClassifier: Send + Sync {
    /// `true` means variants can be generated from this sample.
    async fn classify(&self, question: &str) -> Result<bool, ProviderError>;
}

/// Generates new questions by perturbing a sample's numeric values while
/// keeping its sentence structure.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Produce `count` variants of `sample` on `topic`. `guidance`
    /// carries per-topic constraints the generation must respect, e.g.
    /// "the three side lengths must sum to a multiple of 3".
    async fn generate(
        &self,
        topic: &str,
        sample: &SampleQuestion,
        count: usize,
        guidance: Option<&str>,
    ) -> Result<Vec<String>, ProviderError>;
}

/// Result of reconciling two recognition passes over the same upload.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTranscript {
    /// The reconciled text.
    pub text: String,
    /// Whether the text looks like math course material at all.
    pub math_related: bool,
    /// Human-readable reason when `math_related` is false.
    pub warning: Option<String>,
}

/// Language-model operations over recognized transcripts: reconcile two
/// recognition passes, summarize, and map a summary onto a curriculum
/// unit.
#[async_trait]
pub trait TranscriptModel: Send + Sync {
    /// Reconcile two independent recognition passes into one transcript
    /// and judge whether it is math material.
    async fn merge(&self, first: &str, second: &str) -> Result<MergedTranscript, ProviderError>;

    /// Summarize a transcript with the curriculum units as context.
    async fn summarize(&self, transcript: &str, units: &[String])
        -> Result<String, ProviderError>;

    /// Pick the curriculum unit a summary belongs to.
    async fn select_unit(&self, summary: &str, units: &[String]) -> Result<String, ProviderError>;
}

/// Produces a learner-facing explanation of a section's concept.
#[async_trait]
pub trait Explainer: Send + Sync {
    async fn explain(&self, description: &str) -> Result<String, ProviderError>;
}

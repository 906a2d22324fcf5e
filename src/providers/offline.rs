//! Offline provider implementations
//!
//! Deterministic stand-ins for the model-backed collaborators, used by
//! the demo binary and by tests. They approximate the real behavior
//! with plain string heuristics so the agent graphs run without any
//! network access.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::bank::SampleQuestion;
use super::model::{
    Explainer, MergedTranscript, QuestionGenerator, SampleClassifier, TranscriptModel,
};
use super::ProviderError;

/// Matches integer literals inside a question text.
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("literal pattern"));

/// Vocabulary that marks a transcript as math course material. Matched
/// word for word, not by substring, so "summer" never hits "sum".
const MATH_WORDS: &[&str] = &[
    "equation", "fraction", "triangle", "angle", "circle", "rectangle", "square", "graph", "sum",
    "multiply", "divide", "solve", "length", "area", "perimeter",
];

/// Operator glyphs that mark a transcript as math course material.
const MATH_SYMBOLS: &[&str] = &["+", "=", "\u{d7}", "\u{f7}"];

/// Approves samples whose text carries at least one number, since the
/// offline generator varies questions by perturbing numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineClassifier;

impl OfflineClassifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SampleClassifier for OfflineClassifier {
    async fn classify(&self, question: &str) -> Result<bool, ProviderError> {
        Ok(question.chars().any(|c| c.is_ascii_digit()))
    }
}

/// Generates variants by shifting every number in the sample while
/// keeping the sentence structure intact.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGenerator;

impl OfflineGenerator {
    pub fn new() -> Self {
        Self
    }

    fn perturb(text: &str, offset: u64) -> String {
        NUMBER
            .replace_all(text, |caps: &regex::Captures<'_>| {
                match caps[0].parse::<u64>() {
                    Ok(n) => (n + offset).to_string(),
                    // Digit runs too long for u64 stay as they are.
                    Err(_) => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

#[async_trait]
impl QuestionGenerator for OfflineGenerator {
    async fn generate(
        &self,
        _topic: &str,
        sample: &SampleQuestion,
        count: usize,
        _guidance: Option<&str>,
    ) -> Result<Vec<String>, ProviderError> {
        Ok((1..=count)
            .map(|i| Self::perturb(&sample.text, i as u64))
            .collect())
    }
}

/// Reconciles recognition passes by preferring the longer transcript
/// and judges math relevance from numbers and a marker vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineTranscriptModel;

impl OfflineTranscriptModel {
    const SUMMARY_CHARS: usize = 200;

    pub fn new() -> Self {
        Self
    }

    fn looks_like_math(text: &str) -> bool {
        if text.chars().any(|c| c.is_ascii_digit()) {
            return true;
        }
        if MATH_SYMBOLS.iter().any(|symbol| text.contains(symbol)) {
            return true;
        }
        let lowered = text.to_lowercase();
        lowered
            .split(|c: char| !c.is_alphabetic())
            // A trailing s folds plurals onto the word list.
            .map(|word| word.strip_suffix('s').unwrap_or(word))
            .any(|word| MATH_WORDS.contains(&word))
    }
}

#[async_trait]
impl TranscriptModel for OfflineTranscriptModel {
    async fn merge(&self, first: &str, second: &str) -> Result<MergedTranscript, ProviderError> {
        let first = first.trim();
        let second = second.trim();
        let text = if second.len() > first.len() {
            second
        } else {
            first
        };
        let math_related = Self::looks_like_math(text);
        let warning =
            (!math_related).then(|| "the upload does not read as math course material".to_string());
        Ok(MergedTranscript {
            text: text.to_string(),
            math_related,
            warning,
        })
    }

    async fn summarize(
        &self,
        transcript: &str,
        _units: &[String],
    ) -> Result<String, ProviderError> {
        let trimmed = transcript.trim();
        let cut = trimmed
            .char_indices()
            .nth(Self::SUMMARY_CHARS)
            .map(|(at, _)| at);
        Ok(match cut {
            Some(at) => format!("{}...", &trimmed[..at]),
            None => trimmed.to_string(),
        })
    }

    async fn select_unit(&self, summary: &str, units: &[String]) -> Result<String, ProviderError> {
        let lowered = summary.to_lowercase();
        if let Some(unit) = units.iter().find(|u| lowered.contains(&u.to_lowercase())) {
            return Ok(unit.clone());
        }
        // No unit name appears verbatim; score by word overlap. Ties keep
        // the earliest unit, so an all-zero round falls back to the first.
        let mut best: Option<(&String, usize)> = None;
        for unit in units {
            let score = unit
                .to_lowercase()
                .split_whitespace()
                .filter(|word| word.len() >= 4 && lowered.contains(*word))
                .count();
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((unit, score));
            }
        }
        Ok(best.map(|(unit, _)| unit.clone()).unwrap_or_default())
    }
}

/// Expands a section description into a short learner-facing walkthrough.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineExplainer;

impl OfflineExplainer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Explainer for OfflineExplainer {
    async fn explain(&self, description: &str) -> Result<String, ProviderError> {
        Ok(format!(
            "This section practices the following goal: {description} \
             Restate the question in your own words, work one step at a \
             time, and check each step against that goal before moving on."
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(text: &str) -> SampleQuestion {
        SampleQuestion {
            id: 7,
            text: text.to_string(),
            grade: "3".to_string(),
            term: "1".to_string(),
            unit: "Multiplication".to_string(),
        }
    }

    #[tokio::test]
    async fn test_classifier_approves_numeric_samples() {
        let classifier = OfflineClassifier::new();
        assert!(classifier.classify("Add 3 + 4.").await.unwrap());
        assert!(!classifier.classify("Describe the shape.").await.unwrap());
    }

    #[tokio::test]
    async fn test_generator_shifts_numbers_per_variant() {
        let generator = OfflineGenerator::new();
        let variants = generator
            .generate(
                "Multiplication",
                &sample("There are 3 boxes with 4 pencils each."),
                2,
                None,
            )
            .await
            .unwrap();
        assert_eq!(
            variants,
            vec![
                "There are 4 boxes with 5 pencils each.".to_string(),
                "There are 5 boxes with 6 pencils each.".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_generator_keeps_text_without_numbers() {
        let generator = OfflineGenerator::new();
        let variants = generator
            .generate("Shapes", &sample("Draw a square."), 2, Some("keep it simple"))
            .await
            .unwrap();
        assert_eq!(variants.len(), 2);
        assert!(variants.iter().all(|v| v == "Draw a square."));
    }

    #[tokio::test]
    async fn test_merge_prefers_longer_transcript() {
        let model = OfflineTranscriptModel::new();
        let merged = model
            .merge("3 + 4", "Work out 3 + 4 using the number line.")
            .await
            .unwrap();
        assert_eq!(merged.text, "Work out 3 + 4 using the number line.");
        assert!(merged.math_related);
        assert!(merged.warning.is_none());
    }

    #[tokio::test]
    async fn test_merge_flags_non_math_with_warning() {
        let model = OfflineTranscriptModel::new();
        let merged = model
            .merge("my summer vacation diary", "")
            .await
            .unwrap();
        assert!(!merged.math_related);
        assert!(merged.warning.is_some());

        // Digit-free math wording still passes on vocabulary alone.
        let merged = model
            .merge("we measured every angle of the triangles", "")
            .await
            .unwrap();
        assert!(merged.math_related);
        assert!(merged.warning.is_none());
    }

    #[tokio::test]
    async fn test_summary_truncates_long_transcripts() {
        let model = OfflineTranscriptModel::new();
        let long = "angle ".repeat(100);
        let summary = model.summarize(&long, &[]).await.unwrap();
        assert!(summary.ends_with("..."));
        assert!(summary.chars().count() < long.chars().count());

        let short = model.summarize("two short lines", &[]).await.unwrap();
        assert_eq!(short, "two short lines");
    }

    #[tokio::test]
    async fn test_select_unit_matches_name_then_words() {
        let model = OfflineTranscriptModel::new();
        let units = vec!["Comparing fractions".to_string(), "Angles".to_string()];

        let by_name = model
            .select_unit("the sheet compares angles in triangles", &units)
            .await
            .unwrap();
        assert_eq!(by_name, "Angles");

        let by_word = model
            .select_unit("pupils shade unit fractions on strips", &units)
            .await
            .unwrap();
        assert_eq!(by_word, "Comparing fractions");

        let fallback = model.select_unit("nothing relevant here", &units).await.unwrap();
        assert_eq!(fallback, "Comparing fractions");
    }

    #[tokio::test]
    async fn test_explainer_mentions_description() {
        let explanation = OfflineExplainer::new()
            .explain("Compare fractions with the same denominator.")
            .await
            .unwrap();
        assert!(explanation.contains("Compare fractions with the same denominator."));
    }
}

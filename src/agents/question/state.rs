//! Question agent state and routing codes

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::graph::{GraphState, RouteCode, StateUpdate};
use crate::providers::SampleQuestion;

/// What the caller wants from the question agent.
///
/// The wire codes (1 and 2) double as the routing codes after the
/// request is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    /// Draw existing bank questions as they are.
    Random,
    /// Generate fresh variants from an approved sample.
    Generate,
}

impl RequestKind {
    /// Wire code carried in request payloads.
    pub fn code(self) -> i64 {
        match self {
            Self::Random => 1,
            Self::Generate => 2,
        }
    }

    /// Parse a wire code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Random),
            2 => Some(Self::Generate),
            _ => None,
        }
    }
}

impl From<RequestKind> for RouteCode {
    fn from(kind: RequestKind) -> Self {
        RouteCode::Int(kind.code())
    }
}

/// Outcome of checking a drawn sample's fitness for generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleCheck {
    /// No sample was available to check. Also the value before any check
    /// has run.
    #[default]
    NoSample,
    /// The sample cannot seed generation; another draw is needed.
    Rejected,
    /// The sample can seed generation.
    Approved,
}

impl SampleCheck {
    /// Classification code: 1 approved, 0 rejected, 99 nothing to check.
    pub fn code(self) -> i64 {
        match self {
            Self::NoSample => 99,
            Self::Rejected => 0,
            Self::Approved => 1,
        }
    }
}

impl From<SampleCheck> for RouteCode {
    fn from(check: SampleCheck) -> Self {
        RouteCode::Int(check.code())
    }
}

/// Full state of one question-agent invocation.
#[derive(Debug, Clone)]
pub struct QuestionState {
    /// Topic the request is about.
    pub topic: String,
    /// Requested mode.
    pub kind: RequestKind,
    /// How many questions to return. Zero means "use the default".
    pub count: usize,
    /// The sample currently under consideration, if any.
    pub sample: Option<SampleQuestion>,
    /// Latest sample-check outcome.
    pub check: SampleCheck,
    /// Ids of samples already rejected this invocation. Redraws skip
    /// them so a bad sample is never checked twice.
    pub rejected: HashSet<u64>,
    /// The questions to hand back.
    pub questions: Vec<String>,
}

impl QuestionState {
    /// Seed state for a fresh request.
    pub fn request(topic: impl Into<String>, kind: RequestKind, count: usize) -> Self {
        Self {
            topic: topic.into(),
            kind,
            count,
            sample: None,
            check: SampleCheck::NoSample,
            rejected: HashSet::new(),
            questions: Vec::new(),
        }
    }
}

/// Partial write produced by one question-agent node.
#[derive(Debug, Clone, Default)]
pub struct QuestionUpdate {
    count: Option<usize>,
    sample: Option<Option<SampleQuestion>>,
    check: Option<SampleCheck>,
    rejected: Option<u64>,
    questions: Option<Vec<String>>,
}

impl QuestionUpdate {
    /// Normalize the requested count.
    pub fn count(count: usize) -> Self {
        Self {
            count: Some(count),
            ..Self::default()
        }
    }

    /// Record a draw outcome. `None` means the eligible pool was empty.
    pub fn sample(sample: Option<SampleQuestion>) -> Self {
        Self {
            sample: Some(sample),
            ..Self::default()
        }
    }

    /// Record that the current sample passed the check.
    pub fn approved() -> Self {
        Self {
            check: Some(SampleCheck::Approved),
            ..Self::default()
        }
    }

    /// Record that the sample with `id` failed the check and must not be
    /// drawn again.
    pub fn rejected(id: u64) -> Self {
        Self {
            check: Some(SampleCheck::Rejected),
            rejected: Some(id),
            ..Self::default()
        }
    }

    /// Record that there was nothing to check.
    pub fn no_sample() -> Self {
        Self {
            check: Some(SampleCheck::NoSample),
            ..Self::default()
        }
    }

    /// Set the final question list.
    pub fn questions(questions: Vec<String>) -> Self {
        Self {
            questions: Some(questions),
            ..Self::default()
        }
    }
}

impl StateUpdate for QuestionUpdate {
    fn empty() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        self.count.is_none()
            && self.sample.is_none()
            && self.check.is_none()
            && self.rejected.is_none()
            && self.questions.is_none()
    }

    fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.count.is_some() {
            fields.push("count");
        }
        if self.sample.is_some() {
            fields.push("sample");
        }
        if self.check.is_some() {
            fields.push("check");
        }
        if self.rejected.is_some() {
            fields.push("rejected");
        }
        if self.questions.is_some() {
            fields.push("questions");
        }
        fields
    }
}

impl GraphState for QuestionState {
    type Update = QuestionUpdate;

    fn apply_update(&self, update: QuestionUpdate) -> Self {
        let mut next = self.clone();
        if let Some(count) = update.count {
            next.count = count;
        }
        if let Some(sample) = update.sample {
            next.sample = sample;
        }
        if let Some(check) = update.check {
            next.check = check;
        }
        if let Some(id) = update.rejected {
            next.rejected.insert(id);
        }
        if let Some(questions) = update.questions {
            next.questions = questions;
        }
        next
    }

    fn merge_updates(updates: Vec<QuestionUpdate>) -> QuestionUpdate {
        let mut merged = QuestionUpdate::default();
        for update in updates {
            if update.count.is_some() {
                merged.count = update.count;
            }
            if update.sample.is_some() {
                merged.sample = update.sample;
            }
            if update.check.is_some() {
                merged.check = update.check;
            }
            if update.rejected.is_some() {
                merged.rejected = update.rejected;
            }
            if update.questions.is_some() {
                merged.questions = update.questions;
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_kind_codes_round_trip() {
        assert_eq!(RequestKind::Random.code(), 1);
        assert_eq!(RequestKind::Generate.code(), 2);
        assert_eq!(RequestKind::from_code(1), Some(RequestKind::Random));
        assert_eq!(RequestKind::from_code(2), Some(RequestKind::Generate));
        assert_eq!(RequestKind::from_code(3), None);
        assert_eq!(RouteCode::from(RequestKind::Generate), RouteCode::Int(2));
    }

    #[test]
    fn test_sample_check_codes() {
        assert_eq!(SampleCheck::Approved.code(), 1);
        assert_eq!(SampleCheck::Rejected.code(), 0);
        assert_eq!(SampleCheck::NoSample.code(), 99);
        assert_eq!(RouteCode::from(SampleCheck::NoSample), RouteCode::Int(99));
    }

    #[test]
    fn test_updates_write_only_their_fields() {
        let state = QuestionState::request("Fractions", RequestKind::Generate, 4);
        let state = state.apply_update(QuestionUpdate::rejected(3));

        assert_eq!(state.check, SampleCheck::Rejected);
        assert!(state.rejected.contains(&3));
        // untouched fields persist
        assert_eq!(state.topic, "Fractions");
        assert_eq!(state.count, 4);
        assert!(state.questions.is_empty());
    }

    #[test]
    fn test_rejections_accumulate_across_updates() {
        let state = QuestionState::request("Fractions", RequestKind::Generate, 4)
            .apply_update(QuestionUpdate::rejected(1))
            .apply_update(QuestionUpdate::rejected(2));

        assert!(state.rejected.contains(&1));
        assert!(state.rejected.contains(&2));
    }

    #[test]
    fn test_update_fields_reflect_writes() {
        assert!(QuestionUpdate::empty().is_empty());
        assert_eq!(QuestionUpdate::rejected(9).fields(), vec!["check", "rejected"]);
        assert_eq!(QuestionUpdate::questions(vec![]).fields(), vec!["questions"]);
    }

    #[test]
    fn test_merge_later_write_wins() {
        let merged = QuestionState::merge_updates(vec![
            QuestionUpdate::count(4),
            QuestionUpdate::count(2),
        ]);
        let state = QuestionState::request("t", RequestKind::Random, 0).apply_update(merged);
        assert_eq!(state.count, 2);
    }
}

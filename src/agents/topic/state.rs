//! Topic agent state

use crate::graph::{GraphState, StateUpdate};
use crate::providers::MergedTranscript;

/// Sentinel unit name for uploads that are not math material.
pub const INVALID_UNIT: &str = "INVALID";

/// Full state of one topic-agent invocation.
#[derive(Debug, Clone)]
pub struct TopicState {
    /// First recognition pass over the upload.
    pub first_pass: String,
    /// Second recognition pass over the upload.
    pub second_pass: String,
    /// Reconciled transcript.
    pub merged: String,
    /// Whether the transcript reads as math material.
    pub math_related: bool,
    /// Reason it does not, when it does not.
    pub warning: Option<String>,
    /// Transcript summary, produced on the math path.
    pub summary: String,
    /// Resolved curriculum unit, or [`INVALID_UNIT`].
    pub unit: String,
}

impl TopicState {
    /// Seed state for one upload's recognition passes.
    pub fn upload(first_pass: impl Into<String>, second_pass: impl Into<String>) -> Self {
        Self {
            first_pass: first_pass.into(),
            second_pass: second_pass.into(),
            merged: String::new(),
            math_related: false,
            warning: None,
            summary: String::new(),
            unit: String::new(),
        }
    }
}

/// Partial write produced by one topic-agent node.
#[derive(Debug, Clone, Default)]
pub struct TopicUpdate {
    merged: Option<MergedTranscript>,
    summary: Option<String>,
    unit: Option<String>,
}

impl TopicUpdate {
    /// Record the reconciled transcript and its math judgment.
    pub fn merged(transcript: MergedTranscript) -> Self {
        Self {
            merged: Some(transcript),
            ..Self::default()
        }
    }

    /// Set the transcript summary.
    pub fn summary(summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            ..Self::default()
        }
    }

    /// Set the resolved unit.
    pub fn unit(unit: impl Into<String>) -> Self {
        Self {
            unit: Some(unit.into()),
            ..Self::default()
        }
    }
}

impl StateUpdate for TopicUpdate {
    fn empty() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        self.merged.is_none() && self.summary.is_none() && self.unit.is_none()
    }

    fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.merged.is_some() {
            // One transcript write lands in three state fields.
            fields.extend(["merged", "math_related", "warning"]);
        }
        if self.summary.is_some() {
            fields.push("summary");
        }
        if self.unit.is_some() {
            fields.push("unit");
        }
        fields
    }
}

impl GraphState for TopicState {
    type Update = TopicUpdate;

    fn apply_update(&self, update: TopicUpdate) -> Self {
        let mut next = self.clone();
        if let Some(transcript) = update.merged {
            next.merged = transcript.text;
            next.math_related = transcript.math_related;
            next.warning = transcript.warning;
        }
        if let Some(summary) = update.summary {
            next.summary = summary;
        }
        if let Some(unit) = update.unit {
            next.unit = unit;
        }
        next
    }

    fn merge_updates(updates: Vec<TopicUpdate>) -> TopicUpdate {
        let mut merged = TopicUpdate::default();
        for update in updates {
            if update.merged.is_some() {
                merged.merged = update.merged;
            }
            if update.summary.is_some() {
                merged.summary = update.summary;
            }
            if update.unit.is_some() {
                merged.unit = update.unit;
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_update_lands_in_three_fields() {
        let update = TopicUpdate::merged(MergedTranscript {
            text: "3 + 4 = 7".to_string(),
            math_related: true,
            warning: None,
        });
        assert_eq!(update.fields(), vec!["merged", "math_related", "warning"]);

        let state = TopicState::upload("a", "b").apply_update(update);
        assert_eq!(state.merged, "3 + 4 = 7");
        assert!(state.math_related);
        assert!(state.warning.is_none());
    }

    #[test]
    fn test_updates_leave_unrelated_fields_alone() {
        let state = TopicState::upload("first", "second")
            .apply_update(TopicUpdate::summary("about addition"))
            .apply_update(TopicUpdate::unit("Addition"));

        assert_eq!(state.first_pass, "first");
        assert_eq!(state.summary, "about addition");
        assert_eq!(state.unit, "Addition");
        assert!(!state.math_related);
    }

    #[test]
    fn test_empty_update_writes_nothing() {
        assert!(TopicUpdate::empty().is_empty());
        assert!(TopicUpdate::empty().fields().is_empty());
    }
}

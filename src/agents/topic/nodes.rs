//! Topic agent nodes

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::graph::{Node, NodeError};
use crate::providers::TranscriptModel;

use super::state::{TopicState, TopicUpdate, INVALID_UNIT};

/// Entry node: reconciles the two recognition passes into one transcript
/// and judges whether it is math material.
pub struct MergePasses {
    model: Arc<dyn TranscriptModel>,
}

impl MergePasses {
    pub fn new(model: Arc<dyn TranscriptModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Node<TopicState> for MergePasses {
    async fn run(&self, state: &TopicState) -> Result<TopicUpdate, NodeError> {
        let merged = self
            .model
            .merge(&state.first_pass, &state.second_pass)
            .await?;
        Ok(TopicUpdate::merged(merged))
    }

    fn writes(&self) -> &'static [&'static str] {
        &["merged", "math_related", "warning"]
    }
}

/// Summarizes the transcript with the curriculum units as context.
pub struct Summarize {
    model: Arc<dyn TranscriptModel>,
    units: Vec<String>,
}

impl Summarize {
    pub fn new(model: Arc<dyn TranscriptModel>, units: Vec<String>) -> Self {
        Self { model, units }
    }
}

#[async_trait]
impl Node<TopicState> for Summarize {
    async fn run(&self, state: &TopicState) -> Result<TopicUpdate, NodeError> {
        let summary = self.model.summarize(&state.merged, &self.units).await?;
        Ok(TopicUpdate::summary(summary))
    }

    fn writes(&self) -> &'static [&'static str] {
        &["summary"]
    }
}

/// Picks the curriculum unit the summary belongs to.
pub struct SelectUnit {
    model: Arc<dyn TranscriptModel>,
    units: Vec<String>,
}

impl SelectUnit {
    pub fn new(model: Arc<dyn TranscriptModel>, units: Vec<String>) -> Self {
        Self { model, units }
    }
}

#[async_trait]
impl Node<TopicState> for SelectUnit {
    async fn run(&self, state: &TopicState) -> Result<TopicUpdate, NodeError> {
        if self.units.is_empty() {
            return Err(NodeError::precondition("no curriculum units configured"));
        }
        let unit = self.model.select_unit(&state.summary, &self.units).await?;
        Ok(TopicUpdate::unit(unit))
    }

    fn writes(&self) -> &'static [&'static str] {
        &["unit"]
    }
}

/// Terminal for non-math uploads: logs the reason and marks the unit
/// invalid.
pub struct EndWithWarning;

#[async_trait]
impl Node<TopicState> for EndWithWarning {
    async fn run(&self, state: &TopicState) -> Result<TopicUpdate, NodeError> {
        warn!(
            warning = state.warning.as_deref().unwrap_or("no detail"),
            "upload is not math material"
        );
        Ok(TopicUpdate::unit(INVALID_UNIT))
    }

    fn writes(&self) -> &'static [&'static str] {
        &["unit"]
    }
}

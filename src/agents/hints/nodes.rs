//! Hint agent nodes

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::graph::state::StateUpdate;
use crate::graph::{Node, NodeError};
use crate::providers::{DiagramRenderer, Explainer, SectionCatalog};

use super::state::{HintState, HintUpdate};

/// Entry node: looks the section up in the catalog.
///
/// An unknown section is a hard failure; hint generation has nothing to
/// go on without the catalog record.
pub struct ClassifySection {
    catalog: SectionCatalog,
}

impl ClassifySection {
    pub fn new(catalog: SectionCatalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Node<HintState> for ClassifySection {
    async fn run(&self, state: &HintState) -> Result<HintUpdate, NodeError> {
        match self.catalog.get(&state.section) {
            Some(info) => Ok(HintUpdate::info(info.clone())),
            None => Err(NodeError::new(format!(
                "unknown section '{}'",
                state.section
            ))),
        }
    }

    fn writes(&self) -> &'static [&'static str] {
        &["info"]
    }
}

/// Always-active branch: explains the section goal for the learner.
pub struct ExplainGoal {
    explainer: Arc<dyn Explainer>,
}

impl ExplainGoal {
    pub fn new(explainer: Arc<dyn Explainer>) -> Self {
        Self { explainer }
    }
}

#[async_trait]
impl Node<HintState> for ExplainGoal {
    async fn run(&self, state: &HintState) -> Result<HintUpdate, NodeError> {
        let Some(info) = &state.info else {
            return Err(NodeError::precondition("section not classified"));
        };
        let explanation = self.explainer.explain(&info.description).await?;
        Ok(HintUpdate::explanation(explanation))
    }

    fn writes(&self) -> &'static [&'static str] {
        &["explanation"]
    }
}

/// Renders the section's concept diagram.
pub struct DrawDiagram {
    renderer: Arc<dyn DiagramRenderer>,
}

impl DrawDiagram {
    pub fn new(renderer: Arc<dyn DiagramRenderer>) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl Node<HintState> for DrawDiagram {
    async fn run(&self, state: &HintState) -> Result<HintUpdate, NodeError> {
        let Some(info) = &state.info else {
            return Err(NodeError::precondition("section not classified"));
        };
        let svg = self.renderer.render(&info.concept, info.parameters.as_ref())?;
        Ok(HintUpdate::diagram(svg))
    }

    fn writes(&self) -> &'static [&'static str] {
        &["diagram"]
    }
}

/// Copies the section's reference formulas into the output.
pub struct ListFormulas;

#[async_trait]
impl Node<HintState> for ListFormulas {
    async fn run(&self, state: &HintState) -> Result<HintUpdate, NodeError> {
        let Some(info) = &state.info else {
            return Err(NodeError::precondition("section not classified"));
        };
        Ok(HintUpdate::formulas(info.formulas.clone()))
    }

    fn writes(&self) -> &'static [&'static str] {
        &["formulas"]
    }
}

/// Fan-in barrier. The merge itself happens in the engine; this node
/// only records what arrived.
pub struct CollectHints;

#[async_trait]
impl Node<HintState> for CollectHints {
    async fn run(&self, state: &HintState) -> Result<HintUpdate, NodeError> {
        debug!(
            section = %state.section,
            diagram = state.diagram.is_some(),
            formulas = state.formulas.len(),
            "hints collected"
        );
        Ok(HintUpdate::empty())
    }
}

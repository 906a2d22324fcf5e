//! Hint agent
//!
//! Produces learner hints for a curriculum section. An explanation of
//! the section goal is always generated; the catalog entry decides
//! whether a rendered diagram, reference formulas, both, or neither
//! accompany it. The active branches run concurrently off the same
//! snapshot and their disjoint writes merge at the join.

mod nodes;
mod state;

pub use state::{HintState, HintUpdate};

use std::sync::Arc;

use serde::Serialize;

use crate::engine::{EngineConfig, ExecutionError, Executor, RunOutcome};
use crate::graph::{Graph, GraphBuildError, Selector, END};
use crate::providers::{DiagramRenderer, Explainer, Formula, SectionCatalog};

use nodes::{ClassifySection, CollectHints, DrawDiagram, ExplainGoal, ListFormulas};

/// The hints produced for one section.
#[derive(Debug, Clone, Serialize)]
pub struct HintReport {
    /// The section the hints are for.
    pub section: String,
    /// Learner-facing explanation of the section goal.
    pub explanation: String,
    /// Rendered SVG diagram, when the section gets one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram: Option<String>,
    /// Reference formulas, when the section gets them.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub formulas: Vec<Formula>,
    /// Node executions the run took.
    pub steps: usize,
}

impl HintReport {
    fn from_outcome(outcome: RunOutcome<HintState>) -> Self {
        let state = outcome.state;
        Self {
            section: state.section,
            explanation: state.explanation,
            diagram: state.diagram,
            formulas: state.formulas,
            steps: outcome.steps,
        }
    }
}

/// The hint agent: a built graph plus the engine that runs it.
pub struct HintAgent {
    executor: Executor<HintState>,
}

impl HintAgent {
    pub fn new(
        catalog: SectionCatalog,
        explainer: Arc<dyn Explainer>,
        renderer: Arc<dyn DiagramRenderer>,
    ) -> Result<Self, GraphBuildError> {
        Self::with_config(catalog, explainer, renderer, EngineConfig::default())
    }

    /// Build with explicit engine settings.
    pub fn with_config(
        catalog: SectionCatalog,
        explainer: Arc<dyn Explainer>,
        renderer: Arc<dyn DiagramRenderer>,
        config: EngineConfig,
    ) -> Result<Self, GraphBuildError> {
        let graph = build_graph(catalog, explainer, renderer)?;
        Ok(Self {
            executor: Executor::with_config(graph, config),
        })
    }

    /// The underlying graph, e.g. for rendering.
    pub fn graph(&self) -> &Graph<HintState> {
        self.executor.graph()
    }

    /// Produce hints for one section.
    pub async fn run(&self, section: &str) -> Result<HintReport, ExecutionError> {
        let outcome = self.executor.run(HintState::for_section(section)).await?;
        Ok(HintReport::from_outcome(outcome))
    }
}

fn build_graph(
    catalog: SectionCatalog,
    explainer: Arc<dyn Explainer>,
    renderer: Arc<dyn DiagramRenderer>,
) -> Result<Graph<HintState>, GraphBuildError> {
    Graph::builder("hint_agent")
        .node("classify_section", ClassifySection::new(catalog))
        .node("explain_goal", ExplainGoal::new(explainer))
        .node("draw_diagram", DrawDiagram::new(renderer))
        .node("list_formulas", ListFormulas)
        .node("collect_hints", CollectHints)
        .entry("classify_section")
        .fan_out(
            "classify_section",
            Selector::new(|state: &HintState| {
                let mut active = vec!["explain_goal".to_string()];
                if let Some(info) = &state.info {
                    if info.hint.wants_diagram() {
                        active.push("draw_diagram".to_string());
                    }
                    if info.hint.wants_formula() {
                        active.push("list_formulas".to_string());
                    }
                }
                active
            }),
            ["explain_goal", "draw_diagram", "list_formulas"],
            "collect_hints",
        )
        .edge("collect_hints", END)
        .build()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::providers::{HintKind, OfflineExplainer, SectionInfo, SketchRenderer};

    use super::*;

    fn catalog() -> SectionCatalog {
        SectionCatalog::new()
            .with_section(
                "Recognizing right angles",
                SectionInfo::new("Identify right angles in everyday objects.", "right angle")
                    .with_hint(HintKind::Diagram)
                    .with_parameters(json!({"size": 90})),
            )
            .with_section(
                "Radius and diameter",
                SectionInfo::new("Relate a circle's radius to its diameter.", "circle")
                    .with_hint(HintKind::Both)
                    .with_formula(Formula::new("diameter", "d = 2r")),
            )
            .with_section(
                "Reading bar graphs",
                SectionInfo::new("Read values off a bar graph.", "bar graph"),
            )
            .with_section(
                "Area formulas",
                SectionInfo::new("Apply rectangle area formulas.", "rectangle")
                    .with_hint(HintKind::Formula)
                    .with_formula(Formula::new("rectangle area", "A = w × h")),
            )
    }

    fn agent() -> HintAgent {
        HintAgent::new(
            catalog(),
            Arc::new(OfflineExplainer::new()),
            Arc::new(SketchRenderer::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_both_hints_fan_out_and_merge() {
        let report = agent().run("Radius and diameter").await.unwrap();

        assert!(report
            .explanation
            .contains("Relate a circle's radius to its diameter."));
        assert!(report.diagram.unwrap().contains("<circle"));
        assert_eq!(report.formulas.len(), 1);
        assert_eq!(report.formulas[0].formula, "d = 2r");
        // classify, three branches, join
        assert_eq!(report.steps, 5);
    }

    #[tokio::test]
    async fn test_plain_section_gets_explanation_only() {
        let report = agent().run("Reading bar graphs").await.unwrap();

        assert!(!report.explanation.is_empty());
        assert!(report.diagram.is_none());
        assert!(report.formulas.is_empty());
        // classify, explain, join
        assert_eq!(report.steps, 3);
    }

    #[tokio::test]
    async fn test_diagram_section_skips_formulas() {
        let report = agent().run("Recognizing right angles").await.unwrap();

        assert!(report.diagram.unwrap().contains("90"));
        assert!(report.formulas.is_empty());
        assert_eq!(report.steps, 4);
    }

    #[tokio::test]
    async fn test_formula_section_skips_the_diagram() {
        let report = agent().run("Area formulas").await.unwrap();

        assert!(report.diagram.is_none());
        assert_eq!(report.formulas.len(), 1);
        assert_eq!(report.steps, 4);
    }

    #[tokio::test]
    async fn test_every_section_gets_an_explanation() {
        let agent = agent();
        for section in [
            "Recognizing right angles",
            "Radius and diameter",
            "Reading bar graphs",
            "Area formulas",
        ] {
            let report = agent.run(section).await.unwrap();
            assert!(!report.explanation.is_empty(), "no explanation for {section}");
        }
    }

    #[tokio::test]
    async fn test_unknown_section_fails_classification() {
        let err = agent().run("Quadratic equations").await.unwrap_err();
        assert!(
            matches!(err, ExecutionError::Node { ref node, .. } if node == "classify_section")
        );
    }

    #[test]
    fn test_graph_registers_expected_nodes() {
        let built = agent();
        let names: Vec<_> = built.graph().node_names().collect();
        assert_eq!(
            names,
            vec![
                "classify_section",
                "explain_goal",
                "draw_diagram",
                "list_formulas",
                "collect_hints",
            ]
        );
        assert_eq!(agent().graph().entry(), "classify_section");
    }
}

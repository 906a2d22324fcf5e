//! Hint agent state

use crate::graph::{GraphState, StateUpdate};
use crate::providers::{Formula, SectionInfo};

/// Full state of one hint-agent invocation.
#[derive(Debug, Clone)]
pub struct HintState {
    /// Curriculum section the hints are for.
    pub section: String,
    /// Catalog record, written by classification.
    pub info: Option<SectionInfo>,
    /// Learner-facing explanation of the section goal.
    pub explanation: String,
    /// Rendered SVG diagram, when the section gets one.
    pub diagram: Option<String>,
    /// Reference formulas, when the section gets them.
    pub formulas: Vec<Formula>,
}

impl HintState {
    /// Seed state for one section.
    pub fn for_section(section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            info: None,
            explanation: String::new(),
            diagram: None,
            formulas: Vec::new(),
        }
    }
}

/// Partial write produced by one hint-agent node.
///
/// The three hint fields belong to different fan-out branches, so each
/// update sets at most one of them.
#[derive(Debug, Clone, Default)]
pub struct HintUpdate {
    info: Option<SectionInfo>,
    explanation: Option<String>,
    diagram: Option<String>,
    formulas: Option<Vec<Formula>>,
}

impl HintUpdate {
    /// Record the section's catalog entry.
    pub fn info(info: SectionInfo) -> Self {
        Self {
            info: Some(info),
            ..Self::default()
        }
    }

    /// Set the explanation.
    pub fn explanation(text: impl Into<String>) -> Self {
        Self {
            explanation: Some(text.into()),
            ..Self::default()
        }
    }

    /// Set the rendered diagram.
    pub fn diagram(svg: impl Into<String>) -> Self {
        Self {
            diagram: Some(svg.into()),
            ..Self::default()
        }
    }

    /// Set the reference formulas.
    pub fn formulas(formulas: Vec<Formula>) -> Self {
        Self {
            formulas: Some(formulas),
            ..Self::default()
        }
    }
}

impl StateUpdate for HintUpdate {
    fn empty() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        self.info.is_none()
            && self.explanation.is_none()
            && self.diagram.is_none()
            && self.formulas.is_none()
    }

    fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.info.is_some() {
            fields.push("info");
        }
        if self.explanation.is_some() {
            fields.push("explanation");
        }
        if self.diagram.is_some() {
            fields.push("diagram");
        }
        if self.formulas.is_some() {
            fields.push("formulas");
        }
        fields
    }
}

impl GraphState for HintState {
    type Update = HintUpdate;

    fn apply_update(&self, update: HintUpdate) -> Self {
        let mut next = self.clone();
        if let Some(info) = update.info {
            next.info = Some(info);
        }
        if let Some(explanation) = update.explanation {
            next.explanation = explanation;
        }
        if let Some(diagram) = update.diagram {
            next.diagram = Some(diagram);
        }
        if let Some(formulas) = update.formulas {
            next.formulas = formulas;
        }
        next
    }

    fn merge_updates(updates: Vec<HintUpdate>) -> HintUpdate {
        let mut merged = HintUpdate::default();
        for update in updates {
            if update.info.is_some() {
                merged.info = update.info;
            }
            if update.explanation.is_some() {
                merged.explanation = update.explanation;
            }
            if update.diagram.is_some() {
                merged.diagram = update.diagram;
            }
            if update.formulas.is_some() {
                merged.formulas = update.formulas;
            }
        }
        merged
    }
}

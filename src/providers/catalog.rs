//! Section catalog and diagram rendering
//!
//! The catalog maps curriculum section names to the data hint generation
//! needs: a learner-facing description, the underlying math concept,
//! optional drawing parameters, which kinds of hints the section gets,
//! and its reference formulas. It is pure configuration, loadable from
//! JSON or assembled in code.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ProviderError;

/// Which hints a section gets beyond the always-generated explanation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintKind {
    /// Explanation only.
    #[default]
    None,
    /// Add a rendered diagram.
    Diagram,
    /// Add reference formulas.
    Formula,
    /// Add both a diagram and formulas.
    Both,
}

impl HintKind {
    /// Whether a diagram should be rendered.
    pub fn wants_diagram(self) -> bool {
        matches!(self, Self::Diagram | Self::Both)
    }

    /// Whether formulas should be listed.
    pub fn wants_formula(self) -> bool {
        matches!(self, Self::Formula | Self::Both)
    }
}

impl fmt::Display for HintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::None => "none",
            Self::Diagram => "diagram",
            Self::Formula => "formula",
            Self::Both => "both",
        };
        f.write_str(label)
    }
}

/// A named reference formula, rendered as LaTeX or plain text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formula {
    pub name: String,
    pub formula: String,
}

impl Formula {
    pub fn new(name: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formula: formula.into(),
        }
    }
}

/// Everything the hint pipeline knows about one curriculum section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionInfo {
    /// Learning goal shown to and explained for the learner.
    pub description: String,
    /// Math concept the diagram renderer draws.
    pub concept: String,
    /// Renderer parameters, e.g. `{"size": 90}` for a right angle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
    /// Which hints the section gets.
    #[serde(default)]
    pub hint: HintKind,
    /// Reference formulas, used when `hint` wants them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formulas: Vec<Formula>,
}

impl SectionInfo {
    /// Start a section with a description and concept; hints default to
    /// explanation-only.
    pub fn new(description: impl Into<String>, concept: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            concept: concept.into(),
            parameters: None,
            hint: HintKind::None,
            formulas: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: HintKind) -> Self {
        self.hint = hint;
        self
    }

    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_formula(mut self, formula: Formula) -> Self {
        self.formulas.push(formula);
        self
    }
}

/// Catalog of curriculum sections, keyed by section name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionCatalog {
    sections: HashMap<String, SectionInfo>,
}

impl SectionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a section, replacing any previous entry under the same name.
    pub fn with_section(mut self, name: impl Into<String>, info: SectionInfo) -> Self {
        self.sections.insert(name.into(), info);
        self
    }

    /// Look up a section by name.
    pub fn get(&self, name: &str) -> Option<&SectionInfo> {
        self.sections.get(name)
    }

    /// Parse a catalog from a JSON object of `name -> section`.
    pub fn from_json_str(json: &str) -> Result<Self, ProviderError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the catalog has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Section names, in no particular order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

/// Renders a concept diagram as an SVG document.
///
/// Rendering is pure string assembly, so the trait is synchronous; it
/// still runs inside a fan-out branch and must be callable concurrently.
pub trait DiagramRenderer: Send + Sync {
    fn render(
        &self,
        concept: &str,
        parameters: Option<&serde_json::Value>,
    ) -> Result<String, ProviderError>;
}

/// Built-in renderer covering the basic concept families with simple
/// sketches and a labeled placeholder for everything else.
#[derive(Debug, Clone, Default)]
pub struct SketchRenderer;

impl SketchRenderer {
    pub fn new() -> Self {
        Self
    }

    fn document(body: &str) -> String {
        format!(
            "<svg width=\"500\" height=\"500\" xmlns=\"http://www.w3.org/2000/svg\">{body}</svg>"
        )
    }

    fn angle_degrees(parameters: Option<&serde_json::Value>) -> u64 {
        parameters
            .and_then(|p| p.get("size"))
            .and_then(|v| v.as_u64())
            .unwrap_or(60)
    }
}

impl DiagramRenderer for SketchRenderer {
    fn render(
        &self,
        concept: &str,
        parameters: Option<&serde_json::Value>,
    ) -> Result<String, ProviderError> {
        let body = match concept {
            "line" => "<line x1=\"50\" y1=\"250\" x2=\"450\" y2=\"250\" stroke=\"black\" stroke-width=\"3\"/>".to_string(),
            "angle" | "right angle" => {
                let degrees = Self::angle_degrees(parameters);
                format!(
                    "<path d=\"M 400 400 L 100 400\" stroke=\"black\" stroke-width=\"3\" fill=\"none\"/>\
                     <path d=\"M 400 400 L 150 150\" stroke=\"black\" stroke-width=\"3\" fill=\"none\"/>\
                     <text x=\"330\" y=\"380\" font-size=\"20\">{degrees}&#176;</text>"
                )
            }
            "right triangle" | "triangle" => "<polygon points=\"100,400 400,400 100,120\" stroke=\"black\" stroke-width=\"3\" fill=\"none\"/>".to_string(),
            "rectangle" => "<rect x=\"100\" y=\"160\" width=\"300\" height=\"180\" stroke=\"black\" stroke-width=\"3\" fill=\"none\"/>".to_string(),
            "square" => "<rect x=\"150\" y=\"150\" width=\"200\" height=\"200\" stroke=\"black\" stroke-width=\"3\" fill=\"none\"/>".to_string(),
            "circle" => "<circle cx=\"250\" cy=\"250\" r=\"150\" stroke=\"black\" stroke-width=\"3\" fill=\"none\"/>\
                 <line x1=\"250\" y1=\"250\" x2=\"400\" y2=\"250\" stroke=\"black\" stroke-width=\"2\"/>\
                 <text x=\"300\" y=\"240\" font-size=\"18\">r</text>"
                .to_string(),
            other => format!(
                "<text x=\"250\" y=\"50\" font-size=\"12\" text-anchor=\"middle\">sketch for '{other}' is not drawn yet</text>"
            ),
        };
        Ok(Self::document(&body))
    }
}

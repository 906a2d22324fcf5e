//! External collaborators
//!
//! Traits for everything the agent graphs call out to: the problem bank,
//! the classification and generation models, the transcript model, and
//! the diagram renderer. Production processes plug in real backends;
//! the `offline` module ships deterministic stand-ins used by the demo
//! binary and the tests.
//!
//! All collaborators are constructed once at application start and handed
//! to node constructors, so nodes never reach for hidden globals.

pub mod bank;
pub mod catalog;
pub mod model;
pub mod offline;

use thiserror::Error;

use crate::graph::node::NodeError;

pub use bank::{BankEntry, MemoryBank, ProblemBank, SampleQuestion};
pub use catalog::{
    DiagramRenderer, Formula, HintKind, SectionCatalog, SectionInfo, SketchRenderer,
};
pub use model::{Explainer, MergedTranscript, QuestionGenerator, SampleClassifier, TranscriptModel};
pub use offline::{OfflineClassifier, OfflineExplainer, OfflineGenerator, OfflineTranscriptModel};

/// Errors raised by collaborator implementations.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model error: {0}")]
    Model(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl ProviderError {
    /// Create a model error.
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model(message.into())
    }

    /// Create a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

impl From<ProviderError> for NodeError {
    fn from(err: ProviderError) -> Self {
        let message = err.to_string();
        NodeError::with_source(message, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_converts_to_node_error() {
        let err: NodeError = ProviderError::model("inference backend down").into();
        assert!(err.message().contains("inference backend down"));
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::not_found("curriculum units");
        assert_eq!(format!("{err}"), "not found: curriculum units");
    }
}

//! The tutoring agent graphs
//!
//! Three concrete agents built on the graph engine: question drawing
//! and generation, upload topic resolution, and section hint
//! generation. Each agent validates its graph once at construction and
//! takes every collaborator as an injected trait object.

pub mod hints;
pub mod question;
pub mod topic;

pub use hints::{HintAgent, HintReport, HintState, HintUpdate};
pub use question::{
    GenerationHints, QuestionAgent, QuestionReport, QuestionRequest, QuestionState,
    QuestionUpdate, RequestKind, SampleCheck, DEFAULT_QUESTION_COUNT,
};
pub use topic::{TopicAgent, TopicReport, TopicState, TopicUpdate, INVALID_UNIT};

//! Integration tests for the agent graphs.
//!
//! These run the three agents and the composed service end to end over
//! the offline providers, through the crate's public surface only:
//! - question agent: bank draws, sample-seeded generation, redraw budget
//! - topic agent: transcript merge, the relevance gate, unit resolution
//! - hint agent: catalog-driven fan-out and the merged report
//! - service: unit resolution feeding questions and hints in parallel
//! - one agent shared across concurrent tasks

use std::sync::Arc;

use tutor_agents::providers::{
    BankEntry, Formula, HintKind, MemoryBank, OfflineClassifier, OfflineExplainer,
    OfflineGenerator, OfflineTranscriptModel, ProblemBank, SectionCatalog, SectionInfo,
    SketchRenderer,
};
use tutor_agents::{
    AssistOutcome, GenerationHints, HintAgent, QuestionAgent, QuestionRequest, RequestKind,
    TopicAgent, TutorService, INVALID_UNIT,
};

const CIRCLES: &str = "Radius and diameter";
const ANGLES: &str = "Recognizing right angles";

fn entry(id: u64, topic: &str, question: &str) -> BankEntry {
    BankEntry {
        id,
        topic: topic.to_string(),
        question: question.to_string(),
        has_diagram: false,
        sample: true,
        grade: "3".to_string(),
        term: "1".to_string(),
        unit: topic.to_string(),
    }
}

fn bank() -> Arc<MemoryBank> {
    Arc::new(MemoryBank::new(vec![
        entry(1, CIRCLES, "A circle has a radius of 4 cm. What is its diameter?"),
        entry(2, CIRCLES, "The diameter of a plate is 18 cm. What is its radius?"),
        entry(3, CIRCLES, "Two circles have radii 3 cm and 5 cm. Which is wider?"),
        entry(4, ANGLES, "How many right angles does a rectangle have?"),
        entry(5, ANGLES, "Which corner of the set square is the right angle?"),
    ]))
}

fn catalog() -> SectionCatalog {
    SectionCatalog::new()
        .with_section(
            CIRCLES,
            SectionInfo::new(
                "Relate a circle's radius to its diameter and find one from the other.",
                "circle",
            )
            .with_hint(HintKind::Both)
            .with_formula(Formula::new("diameter", "d = 2r")),
        )
        .with_section(
            ANGLES,
            SectionInfo::new(
                "Identify right angles and tell them apart from other angles.",
                "right angle",
            )
            .with_hint(HintKind::Diagram),
        )
}

fn question_agent() -> QuestionAgent {
    QuestionAgent::new(
        bank(),
        Arc::new(OfflineClassifier::new()),
        Arc::new(OfflineGenerator::new()),
        GenerationHints::new().with_hint(CIRCLES, "keep radii whole centimeters"),
    )
    .expect("question graph should build")
}

fn topic_agent() -> TopicAgent {
    let units = catalog().section_names().map(String::from).collect();
    TopicAgent::new(Arc::new(OfflineTranscriptModel::new()), units)
        .expect("topic graph should build")
}

fn hint_agent() -> HintAgent {
    HintAgent::new(
        catalog(),
        Arc::new(OfflineExplainer::new()),
        Arc::new(SketchRenderer::new()),
    )
    .expect("hint graph should build")
}

fn service() -> TutorService {
    TutorService::new(question_agent(), topic_agent(), hint_agent())
}

/// Random mode hands back bank questions verbatim, without repeats.
#[tokio::test]
async fn test_random_questions_come_from_the_bank() {
    let report = question_agent()
        .run(QuestionRequest::random(CIRCLES, 2))
        .await
        .expect("run failed");

    assert_eq!(report.questions.len(), 2);
    assert_ne!(report.questions[0], report.questions[1]);
    let pool = bank();
    for question in &report.questions {
        assert!(
            pool.entries(CIRCLES)
                .iter()
                .any(|entry| entry.question == *question),
            "{question} is not a bank question"
        );
    }
    assert!(report.sample.is_none());
    assert!(!report.exhausted);
}

/// Generate mode seeds from an approved sample and returns fresh
/// variants rather than bank questions.
#[tokio::test]
async fn test_generated_questions_are_variants_of_a_sample() {
    let report = question_agent()
        .run(QuestionRequest::generate(CIRCLES, 3))
        .await
        .expect("run failed");

    assert_eq!(report.questions.len(), 3);
    let sample = report.sample.expect("an approved sample should be kept");
    assert_eq!(sample.unit, CIRCLES);
    let pool = bank();
    for question in &report.questions {
        assert!(
            !pool
                .entries(CIRCLES)
                .iter()
                .any(|entry| entry.question == *question),
            "{question} was copied from the bank instead of generated"
        );
    }
    assert!(!report.exhausted);
}

/// An unknown topic yields an empty report, not an error.
#[tokio::test]
async fn test_unknown_topic_yields_empty_report() {
    let report = question_agent()
        .run(QuestionRequest::random("Long division", 3))
        .await
        .expect("run failed");

    assert!(report.questions.is_empty());
    assert!(!report.exhausted);
}

/// A math transcript mentioning a unit resolves to that unit.
#[tokio::test]
async fn test_topic_agent_resolves_unit_end_to_end() {
    let report = topic_agent()
        .run(
            "Today we studied the radius and diameter of a circle. \
             If the radius is 4 cm, the diameter is 8 cm.",
            "radius and diameter of a circle, 4 cm and 8 cm",
        )
        .await
        .expect("run failed");

    assert!(report.is_valid());
    assert_eq!(report.unit, CIRCLES);
    assert!(!report.summary.is_empty());
    assert!(report.warning.is_none());
}

/// A non-math upload short-circuits to the invalid unit with a warning.
#[tokio::test]
async fn test_topic_agent_flags_non_math_upload() {
    let report = topic_agent()
        .run("my favorite holiday was at the beach", "")
        .await
        .expect("run failed");

    assert!(!report.is_valid());
    assert_eq!(report.unit, INVALID_UNIT);
    assert!(report.summary.is_empty());
    assert!(report.warning.is_some());
}

/// A section marked for both hint kinds gets an explanation, a diagram,
/// and formulas in one report.
#[tokio::test]
async fn test_hint_agent_fans_out_per_catalog() {
    let report = hint_agent().run(CIRCLES).await.expect("run failed");

    assert_eq!(report.section, CIRCLES);
    assert!(!report.explanation.is_empty());
    let diagram = report.diagram.expect("circle sections get a diagram");
    assert!(diagram.contains("<svg"));
    assert_eq!(report.formulas.len(), 1);
    assert_eq!(report.formulas[0].formula, "d = 2r");
}

/// A diagram-only section gets no formulas.
#[tokio::test]
async fn test_hint_agent_respects_diagram_only_sections() {
    let report = hint_agent().run(ANGLES).await.expect("run failed");

    assert!(report.diagram.is_some());
    assert!(report.formulas.is_empty());
    assert!(!report.explanation.is_empty());
}

/// The full flow: a math upload resolves to a unit, and questions and
/// hints both come back for that unit.
#[tokio::test]
async fn test_service_assist_full_flow() {
    let outcome = service()
        .assist(
            "We practiced the radius and diameter of circles with a 6 cm radius.",
            "",
            RequestKind::Random,
            2,
        )
        .await
        .expect("assist failed");

    let AssistOutcome::Tutored {
        unit,
        questions,
        hints,
    } = outcome
    else {
        panic!("a math upload should be tutored");
    };
    assert_eq!(unit, CIRCLES);
    assert_eq!(questions.questions.len(), 2);
    assert_eq!(hints.section, CIRCLES);
    assert!(hints.diagram.is_some());
}

/// A non-math upload is rejected before any questions or hints run.
#[tokio::test]
async fn test_service_assist_rejects_non_math() {
    let outcome = service()
        .assist("a story about my summer trip", "", RequestKind::Random, 2)
        .await
        .expect("assist failed");

    let AssistOutcome::Rejected { warning } = outcome else {
        panic!("a non-math upload should be rejected");
    };
    assert!(warning.is_some());
}

/// One agent instance serves concurrent requests; runs never share
/// state.
#[tokio::test]
async fn test_shared_agent_across_tasks() {
    let agent = Arc::new(question_agent());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let agent = Arc::clone(&agent);
        handles.push(tokio::spawn(async move {
            agent.run(QuestionRequest::random(CIRCLES, 2)).await
        }));
    }

    for handle in handles {
        let report = handle
            .await
            .expect("task panicked")
            .expect("run failed");
        assert_eq!(report.questions.len(), 2);
    }
}

/// Every agent graph renders a Mermaid flowchart naming its nodes.
#[test]
fn test_graphs_render_mermaid() {
    let question = question_agent();
    let chart = question.graph().mermaid();
    assert!(chart.starts_with("graph TD"));
    assert!(chart.contains("check_sample"));

    let topic = topic_agent();
    assert!(topic.graph().mermaid().contains("merge_passes"));

    let hints = hint_agent();
    assert!(hints.graph().mermaid().contains("collect_hints"));
}

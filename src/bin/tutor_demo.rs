//! Demo CLI for the tutoring agents.
//!
//! Runs the agent graphs against offline providers and a built-in
//! problem bank and section catalog, so the whole pipeline can be
//! exercised without any model backend. A JSONL bank and a JSON catalog
//! can be swapped in via `TUTOR_BANK_PATH` and `TUTOR_CATALOG_PATH`.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tutor_agents::providers::{
    BankEntry, Formula, HintKind, MemoryBank, OfflineClassifier, OfflineExplainer,
    OfflineGenerator, OfflineTranscriptModel, ProblemBank, SectionCatalog, SectionInfo,
    SketchRenderer,
};
use tutor_agents::{
    AppConfig, GenerationHints, HintAgent, QuestionAgent, QuestionRequest, RequestKind,
    TopicAgent, TutorService,
};

#[derive(Parser, Debug)]
#[command(
    name = "tutor-demo",
    version,
    about = "Run the math tutoring agent graphs against offline providers"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose/debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw or generate questions for a topic
    Questions {
        /// Topic to serve questions for
        topic: String,

        /// Whether to draw bank questions or generate fresh variants
        #[arg(short, long, value_enum, default_value_t = Mode::Random)]
        mode: Mode,

        /// How many questions; 0 uses the default
        #[arg(short, long, default_value_t = 0)]
        count: usize,
    },
    /// Resolve the curriculum unit of an upload's transcripts
    Topic {
        /// First recognition pass over the upload
        first: String,

        /// Second recognition pass over the upload
        #[arg(default_value = "")]
        second: String,
    },
    /// Produce hints for a curriculum section
    Hints {
        /// Section name from the catalog
        section: String,
    },
    /// Full flow: resolve the unit, then questions plus hints for it
    Assist {
        /// First recognition pass over the upload
        first: String,

        /// Second recognition pass over the upload
        #[arg(default_value = "")]
        second: String,

        /// Whether to draw bank questions or generate fresh variants
        #[arg(short, long, value_enum, default_value_t = Mode::Random)]
        mode: Mode,

        /// How many questions; 0 uses the default
        #[arg(short, long, default_value_t = 0)]
        count: usize,
    },
    /// Print the agent graphs as Mermaid flowcharts
    Graph,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Random,
    Generate,
}

impl From<Mode> for RequestKind {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Random => RequestKind::Random,
            Mode::Generate => RequestKind::Generate,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let config = AppConfig::from_env()?;
    config.validate()?;
    let service = build_service(&config)?;

    match args.command {
        Command::Questions { topic, mode, count } => {
            let report = service
                .question()
                .run(QuestionRequest {
                    topic,
                    kind: mode.into(),
                    count,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Topic { first, second } => {
            let report = service.topic().run(&first, &second).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Hints { section } => {
            let report = service.hints().run(&section).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Assist {
            first,
            second,
            mode,
            count,
        } => {
            let outcome = service.assist(&first, &second, mode.into(), count).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Graph => {
            println!("{}", service.question().graph().mermaid());
            println!();
            println!("{}", service.topic().graph().mermaid());
            println!();
            println!("{}", service.hints().graph().mermaid());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to set logging subscriber: {e}"))
}

fn build_service(config: &AppConfig) -> Result<TutorService> {
    let bank: Arc<dyn ProblemBank> = match &config.bank_path {
        Some(path) => {
            info!(path = %path.display(), "loading problem bank");
            Arc::new(
                MemoryBank::from_jsonl(path)
                    .with_context(|| format!("loading bank from {}", path.display()))?,
            )
        }
        None => Arc::new(demo_bank()),
    };
    let catalog = match &config.catalog_path {
        Some(path) => {
            info!(path = %path.display(), "loading section catalog");
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading catalog from {}", path.display()))?;
            SectionCatalog::from_json_str(&raw).context("parsing the section catalog")?
        }
        None => demo_catalog(),
    };

    // The topic agent resolves into the sections the hint agent knows.
    let units: Vec<String> = catalog.section_names().map(String::from).collect();

    let question = QuestionAgent::with_config(
        bank,
        Arc::new(OfflineClassifier::new()),
        Arc::new(OfflineGenerator::new()),
        demo_generation_hints(),
        config.engine.clone(),
        config.retry_limit,
    )?;
    let topic = TopicAgent::with_config(
        Arc::new(OfflineTranscriptModel::new()),
        units,
        config.engine.clone(),
    )?;
    let hints = HintAgent::with_config(
        catalog,
        Arc::new(OfflineExplainer::new()),
        Arc::new(SketchRenderer::new()),
        config.engine.clone(),
    )?;

    Ok(TutorService::new(question, topic, hints))
}

fn demo_bank() -> MemoryBank {
    let mut entries = Vec::new();
    let mut add = |topic: &str, question: &str, sample: bool, has_diagram: bool, grade: &str| {
        entries.push(BankEntry {
            id: entries.len() as u64 + 1,
            topic: topic.to_string(),
            question: question.to_string(),
            has_diagram,
            sample,
            grade: grade.to_string(),
            term: "1".to_string(),
            unit: topic.to_string(),
        });
    };

    add(
        "Multiplication",
        "There are 3 baskets with 4 apples in each. How many apples are there in all?",
        true,
        false,
        "2",
    );
    add(
        "Multiplication",
        "A pack holds 6 crayons. How many crayons are in 5 packs?",
        true,
        false,
        "2",
    );
    add(
        "Multiplication",
        "Which fact matches 2 + 2 + 2? (1) 2 × 3 (2) 3 × 3 (3) 2 × 2",
        true,
        false,
        "2",
    );
    add(
        "Multiplication",
        "Count the dots in the picture and write a multiplication fact.",
        true,
        true,
        "2",
    );
    add(
        "Radius and diameter",
        "A circle has a radius of 4 cm. What is its diameter?",
        true,
        false,
        "3",
    );
    add(
        "Radius and diameter",
        "The diameter of a wheel is 10 cm. What is its radius?",
        true,
        false,
        "3",
    );
    add(
        "Radius and diameter",
        "Draw a circle with a radius of 3 cm using a compass.",
        false,
        false,
        "3",
    );
    add(
        "Recognizing right angles",
        "How many right angles does a rectangle have?",
        true,
        false,
        "3",
    );
    add(
        "Recognizing right angles",
        "Look at the clock face in the picture. Is the marked angle a right angle?",
        true,
        true,
        "3",
    );
    add(
        "Recognizing right angles",
        "Which corner of the set square is the right angle? (1) the point (2) the slant (3) the square corner",
        true,
        false,
        "3",
    );

    MemoryBank::new(entries)
}

fn demo_catalog() -> SectionCatalog {
    SectionCatalog::new()
        .with_section(
            "Multiplication",
            SectionInfo::new(
                "Understand multiplication as repeated addition and use it to count groups.",
                "grouping",
            )
            .with_hint(HintKind::Formula)
            .with_formula(Formula::new("commutativity", "a × b = b × a")),
        )
        .with_section(
            "Radius and diameter",
            SectionInfo::new(
                "Relate a circle's radius to its diameter and find one from the other.",
                "circle",
            )
            .with_hint(HintKind::Both)
            .with_formula(Formula::new("diameter", "d = 2r")),
        )
        .with_section(
            "Recognizing right angles",
            SectionInfo::new(
                "Identify right angles and tell them apart from sharper and wider angles.",
                "right angle",
            )
            .with_hint(HintKind::Diagram)
            .with_parameters(json!({"size": 90})),
        )
}

fn demo_generation_hints() -> GenerationHints {
    GenerationHints::new()
        .with_hint(
            "Multiplication",
            "keep every factor a natural number no larger than 9",
        )
        .with_hint(
            "Radius and diameter",
            "keep radii whole centimeters so the diameter stays a natural number",
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_questions() {
        let args = Args::parse_from(["tutor-demo", "questions", "Multiplication", "-m", "generate"]);
        match args.command {
            Command::Questions { topic, mode, count } => {
                assert_eq!(topic, "Multiplication");
                assert!(matches!(mode, Mode::Generate));
                assert_eq!(count, 0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_args_parse_assist_defaults() {
        let args = Args::parse_from(["tutor-demo", "assist", "some transcript"]);
        match args.command {
            Command::Assist {
                first,
                second,
                mode,
                count,
            } => {
                assert_eq!(first, "some transcript");
                assert_eq!(second, "");
                assert!(matches!(mode, Mode::Random));
                assert_eq!(count, 0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_demo_bank_and_catalog_line_up() {
        let bank = demo_bank();
        let catalog = demo_catalog();
        for section in catalog.section_names() {
            assert!(
                !bank.entries(section).is_empty(),
                "no bank questions for {section}"
            );
        }
    }
}

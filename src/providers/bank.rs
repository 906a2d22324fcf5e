//! Problem bank
//!
//! Catalog of bank questions keyed by topic. Entries are loaded once at
//! application start (JSON Lines on disk or assembled in code) and served
//! from memory; per-invocation work is filtering and random draws only.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ProviderError;

/// One question in the bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankEntry {
    /// Stable identifier, unique within the bank.
    pub id: u64,
    /// Topic (sub-unit) the question belongs to.
    pub topic: String,
    /// Question text.
    pub question: String,
    /// Whether the question depends on an embedded diagram. Such entries
    /// cannot seed text-only generation.
    #[serde(default)]
    pub has_diagram: bool,
    /// Whether the entry is short-answer material eligible as a
    /// generation sample.
    #[serde(default)]
    pub sample: bool,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub unit: String,
}

/// A bank entry drawn as the seed for question generation, with the
/// metadata the generator and the caller care about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleQuestion {
    pub id: u64,
    pub text: String,
    pub grade: String,
    pub term: String,
    pub unit: String,
}

impl SampleQuestion {
    /// Build from a bank entry, taking over its metadata.
    pub fn from_entry(entry: &BankEntry, text: impl Into<String>) -> Self {
        Self {
            id: entry.id,
            text: text.into(),
            grade: entry.grade.clone(),
            term: entry.term.clone(),
            unit: entry.unit.clone(),
        }
    }
}

/// Read access to the problem bank. Implementations must be cheap to
/// query concurrently; loading happens before the first invocation.
pub trait ProblemBank: Send + Sync {
    /// All entries for a topic, any kind.
    fn entries(&self, topic: &str) -> Vec<BankEntry>;

    /// Entries eligible as generation samples for a topic.
    fn samples(&self, topic: &str) -> Vec<BankEntry> {
        self.entries(topic)
            .into_iter()
            .filter(|entry| entry.sample)
            .collect()
    }
}

/// In-memory bank backed by a `Vec`, the only implementation the demo
/// and tests need.
#[derive(Debug, Clone, Default)]
pub struct MemoryBank {
    entries: Vec<BankEntry>,
}

impl MemoryBank {
    /// Build from already-loaded entries.
    pub fn new(entries: Vec<BankEntry>) -> Self {
        Self { entries }
    }

    /// Load a JSON Lines file, one `BankEntry` object per line. Blank
    /// lines are skipped.
    pub fn from_jsonl(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let file = File::open(path)?;
        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(&line)?);
        }
        Ok(Self { entries })
    }

    /// Number of entries across all topics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bank holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ProblemBank for MemoryBank {
    fn entries(&self, topic: &str) -> Vec<BankEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.topic == topic)
            .cloned()
            .collect()
    }
}

//! Evaluation report with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::atomic::write_atomic;
use crate::model::{EvaluationSummary, SystemRun};

/// A complete evaluation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Script the corpus is written in.
    pub source_script: String,
    /// Non-blank corpus lines evaluated per pair.
    pub corpus_lines: usize,
    /// One entry per (system, script) pair, in the order requested.
    pub runs: Vec<SystemRun>,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl EvaluationReport {
    pub fn summaries(&self) -> impl Iterator<Item = &EvaluationSummary> {
        self.runs.iter().map(|r| &r.summary)
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        write_atomic(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: EvaluationReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

//! Data model shared by the engine, aggregation and report crates.

use serde::{Deserialize, Serialize};

/// One transliteration system to evaluate against one target script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SystemSpec {
    /// Provider name as registered in the configuration.
    pub system: String,
    /// Target script, e.g. "Devanagari".
    pub script: String,
}

impl SystemSpec {
    pub fn new(system: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            script: script.into(),
        }
    }

    /// `system/script`, used in log messages.
    pub fn label(&self) -> String {
        format!("{}/{}", self.system, self.script)
    }
}

/// Outcome of one round trip of one corpus line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineResult {
    /// 0-based position in the corpus.
    pub index: usize,
    pub original: String,
    /// Output of the forward call, empty if it failed.
    pub forward: String,
    /// Output of the reverse call, empty if either call failed.
    pub round_tripped: String,
    pub exact_match: bool,
    /// Sum of matching block sizes between original and round trip.
    pub matched_chars: usize,
    /// `max(len(original), len(round_tripped))` in characters.
    pub accuracy_denominator: usize,
    pub edit_distance: usize,
    /// Forward output is non-empty and entirely within the target block.
    pub valid_unicode: bool,
    /// Provider error that turned this line into a full loss.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl LineResult {
    /// Character accuracy of this line, 0.0 for an empty denominator.
    pub fn accuracy(&self) -> f64 {
        if self.accuracy_denominator == 0 {
            0.0
        } else {
            self.matched_chars as f64 / self.accuracy_denominator as f64
        }
    }
}

/// A non-exact line: `(original, intermediate, round trip)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTripDiff {
    pub original: String,
    pub intermediate: String,
    pub roundtrip: String,
}

/// A line the provider could not convert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineFailure {
    /// 1-based line number within the corpus.
    pub line: usize,
    pub message: String,
}

/// Corpus-level figures for one (system, script) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    #[serde(rename = "Script")]
    pub script: String,
    #[serde(rename = "System")]
    pub system: String,
    #[serde(rename = "Lines")]
    pub lines: usize,
    #[serde(rename = "ExactMatchesPercent")]
    pub exact_matches_percent: f64,
    #[serde(rename = "CharAccuracyPercent")]
    pub char_accuracy_percent: f64,
    #[serde(rename = "AvgEditDistance")]
    pub avg_edit_distance: f64,
    #[serde(rename = "ValidUnicodeLinesPercent")]
    pub valid_unicode_lines_percent: f64,
}

/// Everything one (system, script) run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemRun {
    pub summary: EvaluationSummary,
    /// Non-exact lines in corpus order.
    pub diffs: Vec<RoundTripDiff>,
    #[serde(default)]
    pub failures: Vec<LineFailure>,
}

impl SystemRun {
    /// Lines whose round trip reproduced the original.
    pub fn exact_matches(&self) -> usize {
        self.summary.lines.saturating_sub(self.diffs.len())
    }
}

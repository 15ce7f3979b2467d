//! Corpus-level aggregation of per-line round-trip results.
//!
//! Percentages are computed on corpus totals (numerators and denominators
//! summed first), not as averages of per-line percentages. The average edit
//! distance is the plain mean over counted lines. Blank lines are excluded
//! from every figure.

use crate::model::{EvaluationSummary, LineFailure, LineResult, RoundTripDiff, SystemRun, SystemSpec};

/// `100 * num / den`, or 0.0 for an empty denominator.
pub fn percent(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        100.0 * num as f64 / den as f64
    }
}

/// Running totals for one (system, script) pair.
#[derive(Debug, Clone, Default)]
pub struct SummaryAccumulator {
    lines: usize,
    exact: usize,
    matched_chars: usize,
    total_chars: usize,
    edit_distance: usize,
    valid_unicode: usize,
    diffs: Vec<RoundTripDiff>,
    failures: Vec<LineFailure>,
}

impl SummaryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one line into the totals. Lines must arrive in corpus order.
    pub fn add(&mut self, line: &LineResult) {
        if line.original.trim().is_empty() {
            return;
        }
        self.lines += 1;
        self.matched_chars += line.matched_chars;
        self.total_chars += line.accuracy_denominator;
        self.edit_distance += line.edit_distance;
        if line.valid_unicode {
            self.valid_unicode += 1;
        }
        if line.exact_match {
            self.exact += 1;
        } else {
            self.diffs.push(RoundTripDiff {
                original: line.original.clone(),
                intermediate: line.forward.clone(),
                roundtrip: line.round_tripped.clone(),
            });
        }
        if let Some(message) = &line.failure {
            self.failures.push(LineFailure {
                line: line.index + 1,
                message: message.clone(),
            });
        }
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn summary(&self, spec: &SystemSpec) -> EvaluationSummary {
        let avg_edit_distance = if self.lines == 0 {
            0.0
        } else {
            self.edit_distance as f64 / self.lines as f64
        };
        EvaluationSummary {
            script: spec.script.clone(),
            system: spec.system.clone(),
            lines: self.lines,
            exact_matches_percent: percent(self.exact, self.lines),
            char_accuracy_percent: percent(self.matched_chars, self.total_chars),
            avg_edit_distance,
            valid_unicode_lines_percent: percent(self.valid_unicode, self.lines),
        }
    }

    pub fn finish(self, spec: &SystemSpec) -> SystemRun {
        SystemRun {
            summary: self.summary(spec),
            diffs: self.diffs,
            failures: self.failures,
        }
    }
}

/// Aggregate an ordered slice of line results.
pub fn aggregate(spec: &SystemSpec, lines: &[LineResult]) -> SystemRun {
    let mut acc = SummaryAccumulator::new();
    for line in lines {
        acc.add(line);
    }
    acc.finish(spec)
}

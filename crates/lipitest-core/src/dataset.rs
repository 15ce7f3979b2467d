//! Dataset hygiene for IAST corpora: duplicate handling, validation and
//! mechanical cleaning.
//!
//! The text functions are pure; the `*_file` variants read with the same
//! encoding checks as corpus loading and write their output atomically.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::atomic::write_atomic;
use crate::corpus::read_text;

/// Lowercase IAST letters.
pub const IAST_LETTERS: &str = "aāiīuūṛṝḷḹeēoōṃḥṅñṭḍṇśṣkgcjtdnpbmyrlvsh";

/// Punctuation, whitespace and digits accepted alongside IAST letters.
pub const IAST_EXTRA: &str = " ,;.?!-'\"\n\t()[]{}/0123456789";

/// Frequent mis-encodings of IAST characters.
pub const IAST_CORRECTIONS: &[(char, char)] = &[
    ('á', 'ā'),
    ('í', 'ī'),
    ('ú', 'ū'),
    ('é', 'ē'),
    ('ó', 'ō'),
    ('ṁ', 'ṃ'),
    ('ş', 'ṣ'),
    ('ç', 'ś'),
    ('ń', 'ṅ'),
];

static SPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").expect("static regex"));

/// A line that occurs more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duplicate {
    pub line: String,
    /// Total occurrences, the kept one included.
    pub count: usize,
    /// 1-based line numbers.
    pub positions: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupStats {
    pub total_lines: usize,
    pub unique_lines: usize,
    pub duplicate_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupOutcome {
    pub output: String,
    pub stats: DedupStats,
    /// Removed lines; `positions` lists the removed occurrences only.
    pub duplicates: Vec<Duplicate>,
}

/// Groups `(key, position)` pairs in first-appearance order.
#[derive(Default)]
struct Occurrences {
    index: HashMap<String, usize>,
    groups: Vec<Duplicate>,
}

impl Occurrences {
    /// Record an occurrence; returns true if the line was seen before.
    fn record(&mut self, line: &str, position: usize) -> bool {
        match self.index.get(line) {
            Some(&i) => {
                self.groups[i].count += 1;
                self.groups[i].positions.push(position);
                true
            }
            None => {
                self.index.insert(line.to_string(), self.groups.len());
                self.groups.push(Duplicate {
                    line: line.to_string(),
                    count: 1,
                    positions: vec![position],
                });
                false
            }
        }
    }
}

/// Keep the first occurrence of every non-blank line, compared trimmed.
///
/// Blank lines and original line endings are kept as they are.
pub fn deduplicate(text: &str) -> DedupOutcome {
    let mut seen = Occurrences::default();
    let mut output = String::with_capacity(text.len());
    let mut stats = DedupStats::default();

    for (i, raw) in text.split_inclusive('\n').enumerate() {
        stats.total_lines += 1;
        let line = raw.trim();
        if line.is_empty() {
            output.push_str(raw);
            continue;
        }
        if seen.record(line, i + 1) {
            stats.duplicate_entries += 1;
        } else {
            stats.unique_lines += 1;
            output.push_str(raw);
        }
    }

    let duplicates = seen
        .groups
        .into_iter()
        .filter(|d| d.count > 1)
        .map(|mut d| {
            d.positions.remove(0);
            d
        })
        .collect();

    DedupOutcome {
        output,
        stats,
        duplicates,
    }
}

pub fn deduplicate_file(input: &Path, output: &Path) -> Result<DedupOutcome> {
    let text = read_text(input)?;
    let outcome = deduplicate(&text);
    write_atomic(output, &outcome.output)?;
    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        removed = outcome.stats.duplicate_entries,
        "deduplicated"
    );
    Ok(outcome)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateReport {
    /// Non-blank lines.
    pub total_lines: usize,
    pub unique_lines: usize,
    /// Occurrences beyond the first, summed over all duplicated lines.
    pub duplicate_entries: usize,
    /// Every duplicated line with all of its positions.
    pub duplicates: Vec<Duplicate>,
}

impl DuplicateReport {
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }
}

/// Report duplicated non-blank lines without changing anything.
pub fn check_duplicates(text: &str) -> DuplicateReport {
    let mut seen = Occurrences::default();
    let mut total_lines = 0;
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        total_lines += 1;
        seen.record(line, i + 1);
    }

    let unique_lines = seen.groups.len();
    let duplicates: Vec<Duplicate> = seen.groups.into_iter().filter(|d| d.count > 1).collect();
    DuplicateReport {
        total_lines,
        unique_lines,
        duplicate_entries: duplicates.iter().map(|d| d.count - 1).sum(),
        duplicates,
    }
}

/// Suggested replacement for a known mis-encoding.
pub fn correction_for(c: char) -> Option<char> {
    IAST_CORRECTIONS
        .iter()
        .find(|(wrong, _)| *wrong == c)
        .map(|(_, right)| *right)
}

/// Whether `c` is acceptable in an IAST corpus (case-insensitive).
pub fn is_valid_iast_char(c: char) -> bool {
    if c.is_ascii_alphanumeric() {
        return true;
    }
    c.to_lowercase()
        .all(|l| IAST_LETTERS.contains(l) || IAST_EXTRA.contains(l))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineIssue {
    /// 1-based line number.
    pub line: usize,
    pub text: String,
    /// `consecutive_spaces` or `invalid_char:<c>` entries.
    pub issues: Vec<String>,
    /// The line with known mis-encodings corrected, if any applied.
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IastReport {
    pub lines_analyzed: usize,
    pub empty_lines: usize,
    pub consecutive_spaces: usize,
    /// Invalid characters, most frequent first, ties in first-appearance order.
    pub invalid_chars: Vec<(char, usize)>,
    pub lines_with_issues: Vec<LineIssue>,
}

impl IastReport {
    pub fn percentage_with_issues(&self) -> f64 {
        crate::statistics::percent(self.lines_with_issues.len(), self.lines_analyzed)
    }
}

/// Validate a corpus against the IAST alphabet.
pub fn check_iast(text: &str) -> IastReport {
    let mut report = IastReport::default();
    let mut invalid: Vec<(char, usize)> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        report.lines_analyzed += 1;
        if line.trim().is_empty() {
            report.empty_lines += 1;
            continue;
        }

        let mut issues = Vec::new();
        if line.contains("  ") {
            report.consecutive_spaces += 1;
            issues.push("consecutive_spaces".to_string());
        }

        let mut suggestion: Option<String> = None;
        for c in line.chars().filter(|c| !is_valid_iast_char(*c)) {
            match invalid.iter_mut().find(|(ch, _)| *ch == c) {
                Some((_, n)) => *n += 1,
                None => invalid.push((c, 1)),
            }
            if let Some(right) = correction_for(c) {
                let fixed = suggestion.take().unwrap_or_else(|| line.to_string());
                suggestion = Some(fixed.replace(c, &right.to_string()));
            }
            issues.push(format!("invalid_char:{c}"));
        }

        if !issues.is_empty() {
            report.lines_with_issues.push(LineIssue {
                line: i + 1,
                text: line.to_string(),
                issues,
                suggestion,
            });
        }
    }

    // stable sort keeps first-appearance order among equal counts
    invalid.sort_by(|a, b| b.1.cmp(&a.1));
    report.invalid_chars = invalid;
    report
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanStats {
    pub lines_processed: usize,
    pub characters_fixed: usize,
    pub consecutive_spaces_fixed: usize,
    pub empty_lines_removed: usize,
}

/// Apply known corrections, collapse space runs and drop blank lines.
pub fn clean_iast(text: &str) -> (String, CleanStats) {
    let mut stats = CleanStats::default();
    let mut output = String::with_capacity(text.len());

    for raw in text.split_inclusive('\n') {
        stats.lines_processed += 1;
        if raw.trim().is_empty() {
            stats.empty_lines_removed += 1;
            continue;
        }

        let mut line = String::with_capacity(raw.len());
        for c in raw.chars() {
            match correction_for(c) {
                Some(right) => {
                    stats.characters_fixed += 1;
                    line.push(right);
                }
                None => line.push(c),
            }
        }

        if SPACE_RUN_RE.is_match(&line) {
            let before = line.chars().count();
            line = SPACE_RUN_RE.replace_all(&line, " ").into_owned();
            stats.consecutive_spaces_fixed += 1;
            stats.characters_fixed += before - line.chars().count();
        }
        output.push_str(&line);
    }

    (output, stats)
}

pub fn clean_iast_file(input: &Path, output: &Path) -> Result<CleanStats> {
    let text = read_text(input)?;
    let (cleaned, stats) = clean_iast(&text);
    write_atomic(output, cleaned)?;
    Ok(stats)
}

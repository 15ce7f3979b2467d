//! Whole-text comparison of an original document against its transliteration.
//!
//! Produces a [`ComparisonResult`] with length and similarity figures,
//! character frequency losses, a sampled word diff and the positional
//! [`LossAnalysis`], plus the plain-text log written by `lipitest compare`.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::align::{DiffTag, SequenceAligner};
use crate::atomic::write_atomic;
use crate::classify::char_name;
use crate::corpus::read_text;
use crate::error::{CompareError, Side};
use crate::loss::{analyze, LossAnalysis};
use crate::similarity::{char_set_similarity, normalize_whitespace, ScoringWeights, SimilarityScorer};

/// Mismatch records listed in the log.
const LOG_MISMATCH_SAMPLE: usize = 20;

/// Bounds on the sampled parts of a [`ComparisonResult`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompareOptions {
    /// Entries kept in each of the lost/added character lists.
    pub max_reported_chars: usize,
    /// Words taken from the start of each text for the word diff.
    pub max_words: usize,
    /// Word diff entries kept.
    pub max_word_diffs: usize,
    pub weights: ScoringWeights,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            max_reported_chars: 20,
            max_words: 200,
            max_word_diffs: 20,
            weights: ScoringWeights::default(),
        }
    }
}

/// A character and how often it occurs in the text it was reported for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharCount {
    pub ch: char,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Characters in the whitespace-normalized original.
    pub original_length: usize,
    /// Characters in the whitespace-normalized transliteration.
    pub transliterated_length: usize,
    pub character_difference: usize,
    pub similarity_ratio: f64,
    pub character_set_similarity: f64,
    /// Characters absent from, or rarer in, the transliteration, with their
    /// count in the original. First-appearance order, truncated.
    pub lost_characters: Vec<CharCount>,
    /// Characters absent from, or rarer in, the original, with their count in
    /// the transliteration. First-appearance order, truncated.
    pub added_characters: Vec<CharCount>,
    /// `- word` / `+ word` entries from the leading words of both texts.
    pub word_diffs: Vec<String>,
    /// Computed on the raw, un-normalized texts.
    pub loss: LossAnalysis,
}

/// Character frequencies in first-appearance order.
fn ordered_counts(chars: &[char]) -> Vec<(char, usize)> {
    let mut index: HashMap<char, usize> = HashMap::new();
    let mut counts: Vec<(char, usize)> = Vec::new();
    for &c in chars {
        match index.get(&c) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(c, counts.len());
                counts.push((c, 1));
            }
        }
    }
    counts
}

/// Entries of `from` whose count exceeds their count in `other`.
fn excess(from: &[(char, usize)], other: &[(char, usize)], limit: usize) -> Vec<CharCount> {
    let other: HashMap<char, usize> = other.iter().copied().collect();
    from.iter()
        .filter(|(c, n)| other.get(c).map_or(true, |m| n > m))
        .take(limit)
        .map(|&(ch, count)| CharCount { ch, count })
        .collect()
}

fn word_diff(original: &str, transliterated: &str, options: &CompareOptions) -> Vec<String> {
    let a: Vec<&str> = original.split_whitespace().take(options.max_words).collect();
    let b: Vec<&str> = transliterated.split_whitespace().take(options.max_words).collect();

    let mut entries = Vec::new();
    for span in SequenceAligner::new(&a, &b).opcodes() {
        if matches!(span.tag, DiffTag::Delete | DiffTag::Replace) {
            entries.extend(a[span.a_start..span.a_end].iter().map(|w| format!("- {w}")));
        }
        if matches!(span.tag, DiffTag::Insert | DiffTag::Replace) {
            entries.extend(b[span.b_start..span.b_end].iter().map(|w| format!("+ {w}")));
        }
        if entries.len() >= options.max_word_diffs {
            break;
        }
    }
    entries.truncate(options.max_word_diffs);
    entries
}

/// Compare two complete texts.
///
/// Either text being empty, or whitespace only, is an [`CompareError::EmptyInput`].
pub fn compare_texts(
    original: &str,
    transliterated: &str,
    options: &CompareOptions,
) -> Result<ComparisonResult, CompareError> {
    let original_clean = normalize_whitespace(original);
    let transliterated_clean = normalize_whitespace(transliterated);
    if original_clean.is_empty() {
        return Err(CompareError::EmptyInput {
            side: Side::Original,
        });
    }
    if transliterated_clean.is_empty() {
        return Err(CompareError::EmptyInput {
            side: Side::Transliterated,
        });
    }

    let a: Vec<char> = original_clean.chars().collect();
    let b: Vec<char> = transliterated_clean.chars().collect();

    let a_counts = ordered_counts(&a);
    let b_counts = ordered_counts(&b);

    Ok(ComparisonResult {
        original_length: a.len(),
        transliterated_length: b.len(),
        character_difference: a.len().abs_diff(b.len()),
        similarity_ratio: SimilarityScorer::new(options.weights).score_chars(&a, &b),
        character_set_similarity: char_set_similarity(&original_clean, &transliterated_clean),
        lost_characters: excess(&a_counts, &b_counts, options.max_reported_chars),
        added_characters: excess(&b_counts, &a_counts, options.max_reported_chars),
        word_diffs: word_diff(&original_clean, &transliterated_clean, options),
        loss: analyze(original, transliterated),
    })
}

fn describe_char(c: char) -> String {
    format!("{c:?} U+{:04X} {}", c as u32, char_name(c))
}

fn write_char_table(out: &mut String, title: &str, entries: &[CharCount]) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "-".repeat(80));
    if entries.is_empty() {
        out.push_str("(none)\n");
    }
    for e in entries {
        let _ = writeln!(out, "{}: {}", describe_char(e.ch), e.count);
    }
    out.push('\n');
}

fn join_counts<K: std::fmt::Display>(counts: impl IntoIterator<Item = (K, usize)>) -> String {
    let parts: Vec<String> = counts.into_iter().map(|(k, n)| format!("{k}={n}")).collect();
    if parts.is_empty() {
        "(none)".to_string()
    } else {
        parts.join(", ")
    }
}

impl ComparisonResult {
    /// Render the comparison log for a pair of files.
    pub fn to_log(&self, original: &Path, transliterated: &Path, generated_at: DateTime<Local>) -> String {
        let rule = "=".repeat(80);
        let thin = "-".repeat(80);
        let mut out = String::new();

        let _ = writeln!(
            out,
            "Transliteration Comparison Log - {}",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        );
        let _ = writeln!(out, "Original file: {}", original.display());
        let _ = writeln!(out, "Transliterated file: {}", transliterated.display());
        let _ = writeln!(out, "{rule}\n");

        let _ = writeln!(out, "SUMMARY\n{thin}");
        let _ = writeln!(out, "Original length: {} characters", self.original_length);
        let _ = writeln!(out, "Transliterated length: {} characters", self.transliterated_length);
        let _ = writeln!(out, "Character difference: {} characters", self.character_difference);
        let _ = writeln!(out, "Similarity ratio: {:.4}", self.similarity_ratio);
        let _ = writeln!(out, "Character set similarity: {:.4}\n", self.character_set_similarity);

        write_char_table(&mut out, "LOST CHARACTERS", &self.lost_characters);
        write_char_table(&mut out, "ADDED CHARACTERS", &self.added_characters);

        let _ = writeln!(out, "WORD DIFFERENCES (sample)\n{thin}");
        if self.word_diffs.is_empty() {
            out.push_str("(none)\n");
        }
        for d in &self.word_diffs {
            let _ = writeln!(out, "{d}");
        }
        out.push('\n');

        let loss = &self.loss;
        let _ = writeln!(out, "LOSS ANALYSIS\n{thin}");
        let _ = writeln!(
            out,
            "Categories (original): {}",
            join_counts(loss.original_categories.iter().map(|(k, v)| (k, *v)))
        );
        let _ = writeln!(
            out,
            "Categories (transliterated): {}",
            join_counts(loss.transliterated_categories.iter().map(|(k, v)| (k, *v)))
        );
        let _ = writeln!(
            out,
            "Punctuation at mismatches (original): {}",
            join_counts(loss.original_punctuation.iter().map(|(k, v)| (k, *v)))
        );
        let _ = writeln!(
            out,
            "Punctuation at mismatches (transliterated): {}",
            join_counts(loss.transliterated_punctuation.iter().map(|(k, v)| (k, *v)))
        );
        let _ = writeln!(
            out,
            "Positional mismatches: {} over {} paired characters ({} unpaired)",
            loss.mismatches.len(),
            loss.paired_len,
            loss.unpaired_tail
        );

        if !loss.ambiguous_mappings.is_empty() {
            out.push_str("Ambiguous mappings:\n");
            for m in &loss.ambiguous_mappings {
                let targets: Vec<String> =
                    m.possible_transliterations.iter().map(|c| format!("{c:?}")).collect();
                let _ = writeln!(out, "  {:?} -> {}", m.original_char, targets.join(", "));
            }
        }

        if !loss.mismatches.is_empty() {
            out.push_str("First mismatches:\n");
            for m in loss.mismatches.iter().take(LOG_MISMATCH_SAMPLE) {
                let _ = writeln!(
                    out,
                    "  #{}: {:?} {} [{}] -> {:?} {} [{}]",
                    m.position,
                    m.original.ch,
                    m.original.name,
                    m.original.category,
                    m.transliterated.ch,
                    m.transliterated.name,
                    m.transliterated.category
                );
            }
        }

        out
    }
}

/// Compare two files and write the comparison log to `log_path`.
///
/// Unreadable or non-UTF-8 inputs fail before anything is written. The log
/// is replaced atomically.
pub fn compare_files(
    original_path: &Path,
    transliterated_path: &Path,
    log_path: &Path,
    options: &CompareOptions,
) -> Result<ComparisonResult> {
    let original = read_text(original_path)?;
    let transliterated = read_text(transliterated_path)?;

    let result = compare_texts(&original, &transliterated, options).with_context(|| {
        format!(
            "comparing {} with {}",
            original_path.display(),
            transliterated_path.display()
        )
    })?;

    let log = result.to_log(original_path, transliterated_path, Local::now());
    write_atomic(log_path, log)?;
    tracing::info!(
        log = %log_path.display(),
        similarity = result.similarity_ratio,
        "comparison written"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_a_structured_error() {
        let opts = CompareOptions::default();
        assert_eq!(
            compare_texts("", "x", &opts),
            Err(CompareError::EmptyInput {
                side: Side::Original
            })
        );
        assert_eq!(
            compare_texts("x", " \n ", &opts),
            Err(CompareError::EmptyInput {
                side: Side::Transliterated
            })
        );
    }

    #[test]
    fn lengths_use_normalized_text() {
        let r = compare_texts("dharmaḥ   rāmaḥ\n", "dharma rāma", &CompareOptions::default()).unwrap();
        assert_eq!(r.original_length, 13);
        assert_eq!(r.transliterated_length, 11);
        assert_eq!(r.character_difference, 2);
    }

    #[test]
    fn lost_and_added_characters() {
        let r = compare_texts("rāmaḥ rāmaḥ", "rāmah ramah", &CompareOptions::default()).unwrap();
        // ḥ vanished, ā is rarer: both reported with their original counts
        assert_eq!(
            r.lost_characters,
            vec![CharCount { ch: 'ā', count: 2 }, CharCount { ch: 'ḥ', count: 2 }]
        );
        assert_eq!(
            r.added_characters,
            vec![CharCount { ch: 'a', count: 3 }, CharCount { ch: 'h', count: 2 }]
        );
    }

    #[test]
    fn reported_characters_are_capped() {
        let opts = CompareOptions {
            max_reported_chars: 2,
            ..CompareOptions::default()
        };
        let r = compare_texts("abcdef", "xyz", &opts).unwrap();
        assert_eq!(r.lost_characters.len(), 2);
        assert_eq!(r.lost_characters[0].ch, 'a');
    }

    #[test]
    fn word_diff_marks_removed_and_added() {
        let r = compare_texts(
            "om namaḥ śivāya",
            "om namah śivāya",
            &CompareOptions::default(),
        )
        .unwrap();
        assert_eq!(r.word_diffs, vec!["- namaḥ", "+ namah"]);
    }

    #[test]
    fn word_diff_sample_is_bounded() {
        let original: Vec<String> = (0..50).map(|i| format!("w{i}")).collect();
        let changed: Vec<String> = (0..50).map(|i| format!("v{i}")).collect();
        let opts = CompareOptions {
            max_word_diffs: 5,
            ..CompareOptions::default()
        };
        let r = compare_texts(&original.join(" "), &changed.join(" "), &opts).unwrap();
        assert_eq!(r.word_diffs.len(), 5);
    }

    #[test]
    fn identical_texts_are_fully_similar() {
        let r = compare_texts("yogaḥ", "yogaḥ", &CompareOptions::default()).unwrap();
        assert_eq!(r.similarity_ratio, 1.0);
        assert_eq!(r.character_set_similarity, 1.0);
        assert!(r.lost_characters.is_empty());
        assert!(r.word_diffs.is_empty());
    }

    #[test]
    fn log_has_summary_lines() {
        let r = compare_texts("rāmaḥ", "rāmah", &CompareOptions::default()).unwrap();
        let log = r.to_log(Path::new("a.txt"), Path::new("b.txt"), Local::now());
        assert!(log.contains("Original file: a.txt"));
        assert!(log.contains("\nOriginal length: 5 characters\n"));
        assert!(log.contains("\nTransliterated length: 5 characters\n"));
        assert!(log.contains("\nCharacter difference: 0 characters\n"));
        assert!(log.contains("\nSimilarity ratio: 0.8000\n"));
        assert!(log.contains("LATIN SMALL LETTER H WITH DOT BELOW"));
        assert!(log.contains("#4:"));
    }

    #[test]
    fn compare_files_writes_log() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("orig.txt");
        let b = dir.path().join("trans.txt");
        let log = dir.path().join("logs/compare.log");
        std::fs::write(&a, "dharmaḥ").unwrap();
        std::fs::write(&b, "dharmah").unwrap();

        let r = compare_files(&a, &b, &log, &CompareOptions::default()).unwrap();
        assert_eq!(r.original_length, 7);
        let text = std::fs::read_to_string(&log).unwrap();
        assert!(text.starts_with("Transliteration Comparison Log - "));
    }

    #[test]
    fn compare_files_empty_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("orig.txt");
        let b = dir.path().join("trans.txt");
        let log = dir.path().join("compare.log");
        std::fs::write(&a, "").unwrap();
        std::fs::write(&b, "x").unwrap();

        let err = compare_files(&a, &b, &log, &CompareOptions::default()).unwrap_err();
        assert!(err.downcast_ref::<CompareError>().is_some());
        assert!(!log.exists());
    }
}

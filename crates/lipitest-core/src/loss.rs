//! Character-level loss analysis between an original text and its
//! transliterated counterpart.
//!
//! Category tallies cover each full string. Mismatch and ambiguity
//! detection pair characters by index and therefore only see the common
//! prefix length: anything past the shorter string is not inspected and is
//! reported only as [`LossAnalysis::unpaired_tail`]. Length-driven loss has to
//! be read from the comparison lengths, not from the mismatch list.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::classify::{category_code, classify, is_punctuation_class, CharInfo};

/// A position where the paired characters differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    pub position: usize,
    pub original: CharInfo,
    pub transliterated: CharInfo,
}

/// An original character that paired with more than one distinct character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguousMapping {
    pub original_char: char,
    /// Distinct paired characters, in code point order.
    pub possible_transliterations: Vec<char>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LossAnalysis {
    /// General category code → count over the whole original text.
    pub original_categories: BTreeMap<String, usize>,
    /// General category code → count over the whole transliterated text.
    pub transliterated_categories: BTreeMap<String, usize>,
    pub mismatches: Vec<Mismatch>,
    /// Punctuation-class characters seen at mismatched positions, original side.
    pub original_punctuation: BTreeMap<char, usize>,
    /// Punctuation-class characters seen at mismatched positions, transliterated side.
    pub transliterated_punctuation: BTreeMap<char, usize>,
    /// In order of each original character's first appearance.
    pub ambiguous_mappings: Vec<AmbiguousMapping>,
    /// Number of index pairs inspected, `min(len(original), len(transliterated))`.
    pub paired_len: usize,
    /// Characters beyond `paired_len` on the longer side, never inspected.
    pub unpaired_tail: usize,
}

impl LossAnalysis {
    /// True when both texts had the same length, so every position was paired.
    pub fn fully_paired(&self) -> bool {
        self.unpaired_tail == 0
    }
}

fn tally_categories(text: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for c in text.chars() {
        *counts.entry(category_code(c).to_string()).or_insert(0) += 1;
    }
    counts
}

/// Analyze index-paired character loss between two texts.
///
/// Inputs are used as given. Whitespace is not normalized since pairing is
/// position-sensitive.
pub fn analyze(original: &str, transliterated: &str) -> LossAnalysis {
    let mut analysis = LossAnalysis {
        original_categories: tally_categories(original),
        transliterated_categories: tally_categories(transliterated),
        ..LossAnalysis::default()
    };

    let mut order: Vec<char> = Vec::new();
    let mut pairings: HashMap<char, BTreeSet<char>> = HashMap::new();
    let mut paired = 0usize;

    for (position, (orig, trans)) in original.chars().zip(transliterated.chars()).enumerate() {
        paired += 1;

        pairings
            .entry(orig)
            .or_insert_with(|| {
                order.push(orig);
                BTreeSet::new()
            })
            .insert(trans);

        if orig == trans {
            continue;
        }
        if is_punctuation_class(orig) {
            *analysis.original_punctuation.entry(orig).or_insert(0) += 1;
        }
        if is_punctuation_class(trans) {
            *analysis.transliterated_punctuation.entry(trans).or_insert(0) += 1;
        }
        analysis.mismatches.push(Mismatch {
            position,
            original: classify(orig),
            transliterated: classify(trans),
        });
    }

    analysis.ambiguous_mappings = order
        .into_iter()
        .filter_map(|c| {
            let targets = &pairings[&c];
            (targets.len() > 1).then(|| AmbiguousMapping {
                original_char: c,
                possible_transliterations: targets.iter().copied().collect(),
            })
        })
        .collect();

    let total_orig = original.chars().count();
    let total_trans = transliterated.chars().count();
    analysis.paired_len = paired;
    analysis.unpaired_tail = total_orig.max(total_trans) - paired;

    analysis
}

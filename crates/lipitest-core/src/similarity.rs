//! Whole-string similarity scoring.
//!
//! The score blends a strict per-index agreement ratio with the
//! frequency-based [`quick_ratio`], which tolerates shifts caused by
//! insertions and deletions. Weights are tunable through [`ScoringWeights`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::align::quick_ratio;

/// Relative weights of the two similarity components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Weight of the positional character-match ratio.
    #[serde(default = "default_positional_weight")]
    pub positional_weight: f64,
    /// Weight of the frequency-intersection ratio.
    #[serde(default = "default_alignment_weight")]
    pub alignment_weight: f64,
}

fn default_positional_weight() -> f64 {
    0.7
}

fn default_alignment_weight() -> f64 {
    0.3
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            positional_weight: default_positional_weight(),
            alignment_weight: default_alignment_weight(),
        }
    }
}

impl ScoringWeights {
    /// Both weights must be finite and non-negative with a positive sum.
    pub fn validate(&self) -> anyhow::Result<()> {
        let (p, q) = (self.positional_weight, self.alignment_weight);
        anyhow::ensure!(
            p.is_finite() && q.is_finite() && p >= 0.0 && q >= 0.0,
            "scoring weights must be finite and non-negative (got {p}, {q})"
        );
        anyhow::ensure!(p + q > 0.0, "scoring weights must not both be zero");
        Ok(())
    }
}

/// Collapse every whitespace run to a single space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fraction of indices `i < min(len)` where both sequences agree.
///
/// Characters past the shorter length are ignored. 0.0 if either side is empty.
pub fn positional_ratio(a: &[char], b: &[char]) -> f64 {
    let shorter = a.len().min(b.len());
    if shorter == 0 {
        return 0.0;
    }
    let matches = a.iter().zip(b).filter(|(x, y)| x == y).count();
    matches as f64 / shorter as f64
}

/// `|distinct(a) ∩ distinct(b)| / max(|distinct(a)|, |distinct(b)|)`.
pub fn char_set_similarity(a: &str, b: &str) -> f64 {
    let a_set: HashSet<char> = a.chars().collect();
    let b_set: HashSet<char> = b.chars().collect();
    let larger = a_set.len().max(b_set.len());
    if larger == 0 {
        return 0.0;
    }
    a_set.intersection(&b_set).count() as f64 / larger as f64
}

/// Scores string pairs with a fixed set of weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityScorer {
    weights: ScoringWeights,
}

impl SimilarityScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Similarity in `[0, 1]` after whitespace normalization of both inputs.
    pub fn score(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = normalize_whitespace(a).chars().collect();
        let b: Vec<char> = normalize_whitespace(b).chars().collect();
        self.score_chars(&a, &b)
    }

    /// Similarity of two already-normalized character sequences.
    pub fn score_chars(&self, a: &[char], b: &[char]) -> f64 {
        let ScoringWeights {
            positional_weight,
            alignment_weight,
        } = self.weights;
        let total = positional_weight + alignment_weight;
        if total <= 0.0 {
            return 0.0;
        }
        let blended = positional_weight * positional_ratio(a, b) + alignment_weight * quick_ratio(a, b);
        (blended / total).clamp(0.0, 1.0)
    }
}

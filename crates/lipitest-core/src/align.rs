//! Longest-common-block sequence alignment.
//!
//! Finds maximal matching blocks between two sequences by recursively taking
//! the longest common contiguous run and recursing on both sides of it, then
//! fills the gaps between blocks with `delete`/`insert`/`replace` spans.
//! The element type is generic so the same aligner handles code points
//! (character accuracy, HTML diffs) and words (comparison word diffs).

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Sequences at least this long get the popular-element heuristic.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Kind of an alignment span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffTag {
    Equal,
    Insert,
    Delete,
    Replace,
}

/// A tagged span of an alignment, as half-open offsets into both sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSpan {
    pub tag: DiffTag,
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
}

impl DiffSpan {
    pub fn a_len(&self) -> usize {
        self.a_end - self.a_start
    }

    pub fn b_len(&self) -> usize {
        self.b_end - self.b_start
    }
}

/// A run of `size` equal elements starting at `a[a]` and `b[b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchingBlock {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

/// Aligns two borrowed sequences.
///
/// The index of `b` is built once in [`SequenceAligner::new`]; every query
/// after that is read-only.
pub struct SequenceAligner<'s, T: Eq + Hash> {
    a: &'s [T],
    b: &'s [T],
    b2j: HashMap<&'s T, Vec<usize>>,
}

impl<'s, T: Eq + Hash> SequenceAligner<'s, T> {
    /// Build an aligner with the popular-element heuristic enabled.
    ///
    /// When `b` has 200 or more elements, any element occurring in more than
    /// 1% of `b` (plus one) is not used to seed matches. Matches can still
    /// extend through such elements.
    pub fn new(a: &'s [T], b: &'s [T]) -> Self {
        Self::with_autojunk(a, b, true)
    }

    pub fn with_autojunk(a: &'s [T], b: &'s [T], autojunk: bool) -> Self {
        let mut b2j: HashMap<&'s T, Vec<usize>> = HashMap::new();
        for (j, elt) in b.iter().enumerate() {
            b2j.entry(elt).or_default().push(j);
        }

        if autojunk && b.len() >= AUTOJUNK_MIN_LEN {
            let threshold = b.len() / 100 + 1;
            let popular: HashSet<&T> = b2j
                .iter()
                .filter(|(_, idxs)| idxs.len() > threshold)
                .map(|(elt, _)| *elt)
                .collect();
            b2j.retain(|elt, _| !popular.contains(elt));
        }

        Self { a, b, b2j }
    }

    /// Longest matching block in `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Ties resolve to the block starting earliest in `a`, then earliest in `b`.
    /// Returns a zero-size block at `(alo, blo)` when nothing matches.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchingBlock {
        let (a, b) = (self.a, self.b);
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0usize);

        // j2len[j] = length of the match ending at a[i-1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for (i, elt) in a.iter().enumerate().take(ahi).skip(alo) {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(elt) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                    next.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next;
        }

        // Grow through elements that were excluded from the index.
        while best_i > alo && best_j > blo && a[best_i - 1] == b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && a[best_i + best_size] == b[best_j + best_size]
        {
            best_size += 1;
        }

        MatchingBlock {
            a: best_i,
            b: best_j,
            size: best_size,
        }
    }

    /// All maximal matching blocks, ordered by position, adjacent blocks merged.
    ///
    /// Unlike some sequence matchers, no zero-size terminator is appended.
    pub fn matching_blocks(&self) -> Vec<MatchingBlock> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            blocks.push(m);
            if alo < m.a && blo < m.b {
                queue.push((alo, m.a, blo, m.b));
            }
            if m.a + m.size < ahi && m.b + m.size < bhi {
                queue.push((m.a + m.size, ahi, m.b + m.size, bhi));
            }
        }
        blocks.sort();

        let mut merged: Vec<MatchingBlock> = Vec::with_capacity(blocks.len());
        for block in blocks {
            match merged.last_mut() {
                Some(last) if last.a + last.size == block.a && last.b + last.size == block.b => {
                    last.size += block.size;
                }
                _ => merged.push(block),
            }
        }
        merged
    }

    /// Number of elements covered by matching blocks.
    pub fn matched_len(&self) -> usize {
        self.matching_blocks().iter().map(|m| m.size).sum()
    }

    /// Spans that turn `a` into `b`, covering both sequences end to end.
    pub fn opcodes(&self) -> Vec<DiffSpan> {
        let mut spans = Vec::new();
        let (mut i, mut j) = (0usize, 0usize);

        let terminator = MatchingBlock {
            a: self.a.len(),
            b: self.b.len(),
            size: 0,
        };
        for m in self.matching_blocks().into_iter().chain(std::iter::once(terminator)) {
            let tag = match (i < m.a, j < m.b) {
                (true, true) => Some(DiffTag::Replace),
                (true, false) => Some(DiffTag::Delete),
                (false, true) => Some(DiffTag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                spans.push(DiffSpan {
                    tag,
                    a_start: i,
                    a_end: m.a,
                    b_start: j,
                    b_end: m.b,
                });
            }
            i = m.a + m.size;
            j = m.b + m.size;
            if m.size > 0 {
                spans.push(DiffSpan {
                    tag: DiffTag::Equal,
                    a_start: m.a,
                    a_end: i,
                    b_start: m.b,
                    b_end: j,
                });
            }
        }
        spans
    }

    /// `2 * matched / (len(a) + len(b))`, or 0.0 when both are empty.
    pub fn ratio(&self) -> f64 {
        dice(self.matched_len(), self.a.len() + self.b.len())
    }

    /// Upper bound on [`ratio`](Self::ratio) from element frequencies alone.
    pub fn quick_ratio(&self) -> f64 {
        quick_ratio(self.a, self.b)
    }
}

/// `2 * M / T` where `M` sums `min(count in a, count in b)` over distinct
/// elements and `T = len(a) + len(b)`. Returns 0.0 when `T` is zero.
pub fn quick_ratio<T: Eq + Hash>(a: &[T], b: &[T]) -> f64 {
    let mut b_counts: HashMap<&T, usize> = HashMap::new();
    for elt in b {
        *b_counts.entry(elt).or_insert(0) += 1;
    }

    let mut matches = 0usize;
    for elt in a {
        if let Some(avail) = b_counts.get_mut(elt) {
            if *avail > 0 {
                *avail -= 1;
                matches += 1;
            }
        }
    }
    dice(matches, a.len() + b.len())
}

fn dice(matches: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        2.0 * matches as f64 / total as f64
    }
}

/// Character-level opcodes for two strings.
pub fn char_opcodes(a: &str, b: &str) -> Vec<DiffSpan> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    SequenceAligner::new(&a, &b).opcodes()
}

/// Sum of matching-block sizes between two strings, in characters.
pub fn matched_chars(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    SequenceAligner::new(&a, &b).matched_len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn span(tag: DiffTag, a_start: usize, a_end: usize, b_start: usize, b_end: usize) -> DiffSpan {
        DiffSpan {
            tag,
            a_start,
            a_end,
            b_start,
            b_end,
        }
    }

    #[test]
    fn matching_blocks_simple() {
        let (a, b) = (chars("abxcd"), chars("abcd"));
        let blocks = SequenceAligner::new(&a, &b).matching_blocks();
        assert_eq!(
            blocks,
            vec![
                MatchingBlock { a: 0, b: 0, size: 2 },
                MatchingBlock { a: 3, b: 2, size: 2 },
            ]
        );
    }

    #[test]
    fn opcodes_cover_all_tags() {
        let (a, b) = (chars("qabxcd"), chars("abycdf"));
        let ops = SequenceAligner::new(&a, &b).opcodes();
        assert_eq!(
            ops,
            vec![
                span(DiffTag::Delete, 0, 1, 0, 0),
                span(DiffTag::Equal, 1, 3, 0, 2),
                span(DiffTag::Replace, 3, 4, 2, 3),
                span(DiffTag::Equal, 4, 6, 3, 5),
                span(DiffTag::Insert, 6, 6, 5, 6),
            ]
        );
    }

    #[test]
    fn longest_match_prefers_earliest() {
        let (a, b) = (chars(" abcd"), chars("abcd abcd"));
        let m = SequenceAligner::new(&a, &b).find_longest_match(0, 5, 0, 9);
        assert_eq!(m, MatchingBlock { a: 0, b: 4, size: 5 });
    }

    #[test]
    fn empty_sides() {
        let empty: Vec<char> = Vec::new();
        let x = chars("xyz");
        assert_eq!(
            SequenceAligner::new(&empty, &x).opcodes(),
            vec![span(DiffTag::Insert, 0, 0, 0, 3)]
        );
        assert_eq!(
            SequenceAligner::new(&x, &empty).opcodes(),
            vec![span(DiffTag::Delete, 0, 3, 0, 0)]
        );
        assert!(SequenceAligner::new(&empty, &empty).opcodes().is_empty());
        assert_eq!(SequenceAligner::new(&empty, &empty).ratio(), 0.0);
    }

    #[test]
    fn quick_ratio_frequency_intersection() {
        let r = quick_ratio(&chars("aab"), &chars("aba"));
        // 'a': min(2, 2) = 2, 'b': min(1, 1) = 1 -> 2 * 3 / 6
        assert!((r - 1.0).abs() < 1e-9, "got {r}");

        let r = quick_ratio(&chars("aab"), &chars("abb"));
        // 'a': min(2, 1) = 1, 'b': min(1, 2) = 1 -> 2 * 2 / 6
        assert!((r - 2.0 / 3.0).abs() < 1e-9, "got {r}");
    }

    #[test]
    fn quick_ratio_bounds_ratio() {
        let (a, b) = (chars("dharmakṣetre"), chars("kurukṣetre"));
        let aligner = SequenceAligner::new(&a, &b);
        assert!(aligner.quick_ratio() >= aligner.ratio());
    }

    #[test]
    fn matched_chars_on_visarga_loss() {
        assert_eq!(matched_chars("rāmaḥ", "rāmah"), 4);
        assert_eq!(matched_chars("dharmaḥ", "dharmaḥ"), 7);
        assert_eq!(matched_chars("abc", ""), 0);
    }

    #[test]
    fn aligns_words() {
        let a = ["vande", "mātaram"];
        let b = ["vande", "mataram"];
        let ops = SequenceAligner::new(&a, &b).opcodes();
        assert_eq!(
            ops,
            vec![
                span(DiffTag::Equal, 0, 1, 0, 1),
                span(DiffTag::Replace, 1, 2, 1, 2),
            ]
        );
    }

    #[test]
    fn popular_elements_still_match_through_extension() {
        let a = chars(&"x".repeat(300));
        let b = a.clone();
        let aligner = SequenceAligner::new(&a, &b);
        assert_eq!(aligner.matched_len(), 300);
        assert!((aligner.ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn autojunk_can_be_disabled() {
        let mut a = chars(&"ab".repeat(150));
        a.push('z');
        let b = chars(&"ba".repeat(150));
        let with = SequenceAligner::new(&a, &b).matched_len();
        let without = SequenceAligner::with_autojunk(&a, &b, false).matched_len();
        assert!(without >= with);
        assert_eq!(without, 299);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn reconstruct(seq: &[char], spans: &[DiffSpan], side_a: bool) -> Vec<char> {
            let mut out = Vec::new();
            let mut cursor = 0;
            for s in spans {
                let (start, end) = if side_a { (s.a_start, s.a_end) } else { (s.b_start, s.b_end) };
                assert_eq!(start, cursor, "spans must be contiguous");
                out.extend_from_slice(&seq[start..end]);
                cursor = end;
            }
            out
        }

        proptest! {
            #[test]
            fn spans_reconstruct_both_sides(a in "[abcḥā ]{0,40}", b in "[abcḥā ]{0,40}") {
                let (a, b) = (chars(&a), chars(&b));
                let spans = SequenceAligner::new(&a, &b).opcodes();
                prop_assert_eq!(reconstruct(&a, &spans, true), a.clone());
                prop_assert_eq!(reconstruct(&b, &spans, false), b.clone());
                let a_total: usize = spans.iter().map(DiffSpan::a_len).sum();
                let b_total: usize = spans.iter().map(DiffSpan::b_len).sum();
                prop_assert_eq!(a_total, a.len());
                prop_assert_eq!(b_total, b.len());
            }

            #[test]
            fn equal_spans_hold_equal_elements(a in "[xyz]{0,30}", b in "[xyz]{0,30}") {
                let (a, b) = (chars(&a), chars(&b));
                let aligner = SequenceAligner::new(&a, &b);
                let mut equal_total = 0;
                for s in aligner.opcodes().iter().filter(|s| s.tag == DiffTag::Equal) {
                    prop_assert_eq!(&a[s.a_start..s.a_end], &b[s.b_start..s.b_end]);
                    equal_total += s.a_len();
                }
                prop_assert_eq!(equal_total, aligner.matched_len());
            }

            #[test]
            fn ratios_in_unit_interval(a in ".{0,30}", b in ".{0,30}") {
                let (a, b) = (chars(&a), chars(&b));
                let aligner = SequenceAligner::new(&a, &b);
                prop_assert!((0.0..=1.0).contains(&aligner.ratio()));
                prop_assert!((0.0..=1.0).contains(&aligner.quick_ratio()));
                prop_assert!(aligner.quick_ratio() + 1e-12 >= aligner.ratio());
            }
        }
    }
}

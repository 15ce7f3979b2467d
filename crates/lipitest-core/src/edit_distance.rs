//! Levenshtein edit distance over Unicode scalar values.

/// Minimum number of single-character insertions, deletions and
/// substitutions (unit cost each) turning `a` into `b`.
///
/// Operates on `char`s, not bytes, so `"ḥ"` counts as one position.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    levenshtein_slice(&a, &b)
}

/// Levenshtein distance over arbitrary comparable sequences.
///
/// Keeps a single rolling row of the `(len(a)+1) x (len(b)+1)` table since
/// only the final cell is consumed.
pub fn levenshtein_slice<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // row[j] holds dp[i][j] for the row being filled; `diag` carries dp[i-1][j-1].
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diag
            } else {
                1 + above.min(row[j]).min(diag)
            };
            diag = above;
        }
    }

    row[b.len()]
}

//! Corpus input: UTF-8 files, pasted text (plain lines or HTML tables) and
//! the built-in sample.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CorpusError;

/// Used when neither a file nor text is supplied.
pub const SAMPLE_CORPUS: &[&str] = &["dharmaḥ", "prajñā", "śāstra", "yogaḥ", "rāmaḥ"];

static ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").expect("static regex"));
static CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<td[^>]*>(.*?)</td>").expect("static regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static regex"));
static COLUMN_SEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}|\t").expect("static regex"));

/// Where evaluation lines come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusSource {
    File {
        path: PathBuf,
        max_lines: Option<usize>,
    },
    Text(String),
    Sample,
}

impl CorpusSource {
    pub fn load(&self) -> Result<Vec<String>, CorpusError> {
        match self {
            CorpusSource::File { path, max_lines } => load_lines(path, *max_lines),
            CorpusSource::Text(text) => Ok(parse_input_text(text)),
            CorpusSource::Sample => Ok(SAMPLE_CORPUS.iter().map(|s| s.to_string()).collect()),
        }
    }

    /// Short description for log messages.
    pub fn describe(&self) -> String {
        match self {
            CorpusSource::File { path, .. } => path.display().to_string(),
            CorpusSource::Text(_) => "direct input".to_string(),
            CorpusSource::Sample => "built-in sample".to_string(),
        }
    }
}

/// Read a whole file as UTF-8.
///
/// Invalid UTF-8 is reported with the byte offset of the first bad sequence.
pub fn read_text(path: &Path) -> Result<String, CorpusError> {
    let bytes = std::fs::read(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|e| CorpusError::Encoding {
        path: path.to_path_buf(),
        offset: e.utf8_error().valid_up_to(),
    })
}

/// Read a corpus file into trimmed lines, keeping blank lines.
///
/// `max_lines` counts raw lines, blank ones included.
pub fn load_lines(path: &Path, max_lines: Option<usize>) -> Result<Vec<String>, CorpusError> {
    let text = read_text(path)?;
    let lines = text.lines().map(|l| l.trim().to_string());
    Ok(match max_lines {
        Some(n) => lines.take(n).collect(),
        None => lines.collect(),
    })
}

/// Extract corpus lines from pasted text.
///
/// HTML tables contribute the first cell of each row, with tags stripped and
/// entities decoded. Plain text contributes each non-empty line up to the
/// first tab or run of two or more whitespace characters. Header rows from
/// earlier reports are skipped.
pub fn parse_input_text(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    if lower.contains("<table") || lower.contains("<tr") {
        return ROW_RE
            .captures_iter(text)
            .filter_map(|row| {
                let cell = CELL_RE.captures(&row[1])?;
                let stripped = TAG_RE.replace_all(&cell[1], "");
                let clean = unescape_html(&stripped).trim().to_string();
                (!clean.is_empty()).then_some(clean)
            })
            .collect();
    }

    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.contains("Original IAST") && !l.contains("Back-Converted"))
        .filter_map(|l| {
            let first = COLUMN_SEP_RE.split(l).next().unwrap_or(l).trim();
            (!first.is_empty()).then(|| first.to_string())
        })
        .collect()
}

/// Decode named and numeric character references.
///
/// Unknown or malformed references are kept verbatim.
pub fn unescape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').and_then(|semi| {
            let entity = &tail[1..semi];
            decode_entity(entity).map(|c| (c, semi + 1))
        });
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(num) = entity.strip_prefix('#') {
        let code = match num.strip_prefix(|c| c == 'x' || c == 'X') {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    Some(match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => return None,
    })
}

//! HTML diff report generator.
//!
//! Produces one self-contained HTML file per (system, script) run with all
//! CSS/JS inlined.

use std::path::Path;

use anyhow::{Context, Result};

use lipitest_core::align::{char_opcodes, DiffTag};
use lipitest_core::atomic::write_atomic;
use lipitest_core::model::{RoundTripDiff, SystemRun};

/// Escape a string for safe HTML insertion.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn slice(chars: &[char], start: usize, end: usize) -> String {
    chars[start..end].iter().collect()
}

fn span(class: &str, text: &str) -> String {
    format!("<span class=\"{class}\">{}</span>", html_escape(text))
}

/// Render one diff row: original, script text and back-converted cells.
///
/// The original side marks removed text as `delete`, the back-converted
/// side marks new text as `insert`; a replaced span shows on both.
pub fn diff_row(diff: &RoundTripDiff) -> String {
    let a: Vec<char> = diff.original.chars().collect();
    let b: Vec<char> = diff.roundtrip.chars().collect();
    let opcodes = char_opcodes(&diff.original, &diff.roundtrip);

    let mut original = String::new();
    let mut converted = String::new();
    for op in &opcodes {
        match op.tag {
            DiffTag::Equal => {
                original.push_str(&span("equal", &slice(&a, op.a_start, op.a_end)));
                converted.push_str(&span("equal", &slice(&b, op.b_start, op.b_end)));
            }
            DiffTag::Delete => original.push_str(&span("delete", &slice(&a, op.a_start, op.a_end))),
            DiffTag::Insert => converted.push_str(&span("insert", &slice(&b, op.b_start, op.b_end))),
            DiffTag::Replace => {
                original.push_str(&span("delete", &slice(&a, op.a_start, op.a_end)));
                converted.push_str(&span("insert", &slice(&b, op.b_start, op.b_end)));
            }
        }
    }

    let mut row = String::from("<div class=\"diff-row\">\n");
    row.push_str(&format!(
        "<div class=\"diff-cell\"><div class=\"diff-label\">Original IAST</div><div class=\"diff-content original-text\">{original}</div></div>\n"
    ));
    if !diff.intermediate.is_empty() {
        row.push_str(&format!(
            "<div class=\"diff-cell\"><div class=\"diff-label\">Script Text</div><div class=\"diff-content script-text\">{}</div></div>\n",
            html_escape(&diff.intermediate)
        ));
    }
    row.push_str(&format!(
        "<div class=\"diff-cell\"><div class=\"diff-label\">Back-Converted IAST</div><div class=\"diff-content converted-text\">{converted}</div></div>\n"
    ));
    row.push_str("</div>\n");
    row
}

fn stat_card(class: &str, value: &str, label: &str) -> String {
    format!(
        "<div class=\"stat-card {class}\"><div class=\"stat-value\">{value}</div><div class=\"stat-label\">{label}</div></div>\n"
    )
}

/// Generate the HTML report for one run, keeping at most `max_diffs` rows.
pub fn generate_html(run: &SystemRun, max_diffs: Option<usize>) -> String {
    let s = &run.summary;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>lipitest: {} / {}</title>\n",
        html_escape(&s.system),
        html_escape(&s.script)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n<div class=\"container\">\n");

    html.push_str("<header>\n");
    html.push_str("<h1>Round-trip transliteration report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">System: <strong>{}</strong> | Script: <strong>{}</strong> | {} lines</p>\n",
        html_escape(&s.system),
        html_escape(&s.script),
        s.lines
    ));
    html.push_str("</header>\n");

    // Summary block
    let exact_class = if s.lines > 0 && run.exact_matches() == s.lines {
        "success"
    } else if run.exact_matches() == 0 {
        "danger"
    } else {
        "warning"
    };
    html.push_str("<section class=\"summary\">\n");
    html.push_str(&stat_card(
        exact_class,
        &format!("{:.1}%", s.exact_matches_percent),
        &format!("Exact Matches ({} of {})", run.exact_matches(), s.lines),
    ));
    html.push_str(&stat_card("", &format!("{:.1}%", s.char_accuracy_percent), "Character Accuracy"));
    html.push_str(&stat_card("", &format!("{:.2}", s.avg_edit_distance), "Avg Edit Distance"));
    html.push_str(&stat_card(
        "",
        &format!("{:.1}%", s.valid_unicode_lines_percent),
        "Valid Unicode Lines",
    ));
    html.push_str(&stat_card("", &run.diffs.len().to_string(), "Differences Found"));
    html.push_str("</section>\n");

    if !run.failures.is_empty() {
        html.push_str("<section class=\"failures\">\n<h2>Provider failures</h2>\n<ul>\n");
        for f in &run.failures {
            html.push_str(&format!("<li>line {}: {}</li>\n", f.line, html_escape(&f.message)));
        }
        html.push_str("</ul>\n</section>\n");
    }

    html.push_str("<section class=\"diff-container\">\n<h2>Differences</h2>\n");
    html.push_str("<input id=\"filter\" type=\"search\" placeholder=\"Filter rows\" oninput=\"filterRows(this.value)\">\n");
    let shown = max_diffs.unwrap_or(run.diffs.len()).min(run.diffs.len());
    for diff in &run.diffs[..shown] {
        html.push_str(&diff_row(diff));
    }
    if shown < run.diffs.len() {
        html.push_str(&format!(
            "<p class=\"meta\">{} more differences not shown</p>\n",
            run.diffs.len() - shown
        ));
    }
    html.push_str("</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</div>\n</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(run: &SystemRun, path: &Path, max_diffs: Option<usize>) -> Result<()> {
    let html = generate_html(run, max_diffs);
    write_atomic(path, html).with_context(|| format!("failed to write HTML report to {}", path.display()))
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --equal: transparent; --delete: #fde2e2; --insert: #dcfce7; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --delete: #7f1d1d; --insert: #064e3b; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
.container { max-width: 1200px; margin: 0 auto; }
.meta { color: #6b7280; }
.summary { display: flex; flex-wrap: wrap; gap: 1rem; margin: 1rem 0; }
.stat-card { border: 1px solid var(--border); border-radius: 8px; padding: 1rem 1.5rem; min-width: 150px; }
.stat-card.success { border-color: #22c55e; }
.stat-card.warning { border-color: #eab308; }
.stat-card.danger { border-color: #ef4444; }
.stat-value { font-size: 1.5rem; font-weight: bold; }
.stat-label { color: #6b7280; }
.diff-row { display: flex; gap: 1rem; border-bottom: 1px solid var(--border); padding: 0.75rem 0; }
.diff-cell { flex: 1; }
.diff-label { font-size: 0.75rem; color: #6b7280; text-transform: uppercase; }
.diff-content { font-size: 1.1rem; white-space: pre-wrap; }
.delete { background: var(--delete); text-decoration: line-through; }
.insert { background: var(--insert); }
#filter { width: 100%; padding: 0.5rem; margin-bottom: 1rem; }
"#;

const JS: &str = r#"
function filterRows(q) {
  const needle = q.toLowerCase();
  document.querySelectorAll('.diff-row').forEach(r => {
    r.style.display = r.textContent.toLowerCase().includes(needle) ? '' : 'none';
  });
}
"#;

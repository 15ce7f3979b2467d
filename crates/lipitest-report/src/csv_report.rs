//! CSV exports: per-run diff rows, the cross-run summary table and IAST
//! validation issues.

use std::path::Path;

use anyhow::{Context, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use lipitest_core::atomic::write_atomic;
use lipitest_core::dataset::IastReport;
use lipitest_core::model::{EvaluationSummary, SystemRun};

pub const DIFF_HEADER: &str = "Original IAST,Script Text,Back-Converted IAST";

fn into_string(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    String::from_utf8(wtr.into_inner()?).context("CSV output is not valid UTF-8")
}

/// One row per non-exact line, every field quoted.
pub fn diff_csv(run: &SystemRun) -> Result<String> {
    let mut buf = DIFF_HEADER.as_bytes().to_vec();
    buf.push(b'\n');
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buf);

    for d in &run.diffs {
        wtr.write_record([&d.original, &d.intermediate, &d.roundtrip])?;
    }
    wtr.flush()?;
    into_string(wtr)
}

/// Summary table over all runs, headed by the exposed field names.
pub fn summary_csv<'a>(summaries: impl IntoIterator<Item = &'a EvaluationSummary>) -> Result<String> {
    let mut wtr = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(vec![]);
    let mut wrote_any = false;
    for s in summaries {
        wtr.serialize(s)?;
        wrote_any = true;
    }
    if !wrote_any {
        wtr.write_record([
            "Script",
            "System",
            "Lines",
            "ExactMatchesPercent",
            "CharAccuracyPercent",
            "AvgEditDistance",
            "ValidUnicodeLinesPercent",
        ])?;
    }
    wtr.flush()?;
    into_string(wtr)
}

/// Lines flagged by the IAST validator.
pub fn iast_issues_csv(report: &IastReport) -> Result<String> {
    let mut wtr = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(vec![]);
    wtr.write_record(["Line", "Text", "Issues", "Suggestion"])?;
    for issue in &report.lines_with_issues {
        wtr.write_record([
            issue.line.to_string().as_str(),
            &issue.text,
            &issue.issues.join("; "),
            issue.suggestion.as_deref().unwrap_or(""),
        ])?;
    }
    wtr.flush()?;
    into_string(wtr)
}

pub fn write_diff_csv(run: &SystemRun, path: &Path) -> Result<()> {
    write_atomic(path, diff_csv(run)?).with_context(|| format!("failed to write {}", path.display()))
}

pub fn write_summary_csv<'a>(summaries: impl IntoIterator<Item = &'a EvaluationSummary>, path: &Path) -> Result<()> {
    write_atomic(path, summary_csv(summaries)?).with_context(|| format!("failed to write {}", path.display()))
}

pub fn write_iast_issues_csv(report: &IastReport, path: &Path) -> Result<()> {
    write_atomic(path, iast_issues_csv(report)?).with_context(|| format!("failed to write {}", path.display()))
}

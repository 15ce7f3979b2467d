//! The `lipitest dataset` subcommands.

use std::path::Path;

use anyhow::Result;

use lipitest_core::corpus::read_text;
use lipitest_core::dataset::{check_duplicates, check_iast, clean_iast_file, deduplicate_file, Duplicate};
use lipitest_report::csv_report::write_iast_issues_csv;

use crate::DatasetCommand;

/// Duplicates listed individually before the output is summarised.
const MAX_LISTED: usize = 20;

pub fn execute(command: DatasetCommand) -> Result<()> {
    match command {
        DatasetCommand::Dedup { input, output } => dedup(&input, &output),
        DatasetCommand::CheckDuplicates { input } => duplicates(&input),
        DatasetCommand::CheckIast { input, csv } => iast(&input, csv.as_deref()),
        DatasetCommand::CleanIast { input, output } => clean(&input, &output),
    }
}

fn print_duplicates(duplicates: &[Duplicate]) {
    for d in duplicates.iter().take(MAX_LISTED) {
        let positions: Vec<String> = d.positions.iter().map(|p| p.to_string()).collect();
        println!("  '{}' x{} (lines {})", d.line, d.count, positions.join(", "));
    }
    if duplicates.len() > MAX_LISTED {
        println!("  ... and {} more", duplicates.len() - MAX_LISTED);
    }
}

fn dedup(input: &Path, output: &Path) -> Result<()> {
    let outcome = deduplicate_file(input, output)?;
    let s = &outcome.stats;
    println!("Total lines: {}", s.total_lines);
    println!("Unique lines: {}", s.unique_lines);
    println!("Duplicates removed: {}", s.duplicate_entries);
    print_duplicates(&outcome.duplicates);
    println!("Deduplicated file: {}", output.display());
    Ok(())
}

fn duplicates(input: &Path) -> Result<()> {
    let report = check_duplicates(&read_text(input)?);
    println!("Total lines: {}", report.total_lines);
    println!("Unique lines: {}", report.unique_lines);
    if report.has_duplicates() {
        println!("Duplicate entries: {}", report.duplicate_entries);
        print_duplicates(&report.duplicates);
    } else {
        println!("No duplicates found");
    }
    Ok(())
}

fn iast(input: &Path, csv: Option<&Path>) -> Result<()> {
    let report = check_iast(&read_text(input)?);
    println!("Lines analyzed: {}", report.lines_analyzed);
    println!("Empty lines: {}", report.empty_lines);
    println!("Lines with consecutive spaces: {}", report.consecutive_spaces);
    println!(
        "Lines with issues: {} ({:.1}%)",
        report.lines_with_issues.len(),
        report.percentage_with_issues()
    );

    if !report.invalid_chars.is_empty() {
        println!("\nInvalid characters:");
        for (c, n) in &report.invalid_chars {
            println!("  '{c}' (U+{:04X}) x{n}", *c as u32);
        }
    }
    for issue in report.lines_with_issues.iter().take(MAX_LISTED) {
        println!("\nline {}: {}", issue.line, issue.text);
        println!("  issues: {}", issue.issues.join(", "));
        if let Some(s) = &issue.suggestion {
            println!("  suggestion: {s}");
        }
    }

    if let Some(path) = csv {
        write_iast_issues_csv(&report, path)?;
        println!("\nIssues CSV: {}", path.display());
    }
    Ok(())
}

fn clean(input: &Path, output: &Path) -> Result<()> {
    let stats = clean_iast_file(input, output)?;
    println!("Lines processed: {}", stats.lines_processed);
    println!("Characters fixed: {}", stats.characters_fixed);
    println!("Consecutive spaces fixed: {}", stats.consecutive_spaces_fixed);
    println!("Empty lines removed: {}", stats.empty_lines_removed);
    println!("Cleaned file: {}", output.display());
    Ok(())
}

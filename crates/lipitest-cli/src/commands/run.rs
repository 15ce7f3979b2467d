//! The `lipitest run` command.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;

use lipitest_core::align::{char_opcodes, DiffTag};
use lipitest_core::corpus::CorpusSource;
use lipitest_core::engine::{EvalEngine, ProgressReporter};
use lipitest_core::model::{LineResult, SystemRun, SystemSpec};
use lipitest_core::report::EvaluationReport;
use lipitest_providers::config::load_config_from;
use lipitest_report::csv_report::{write_diff_csv, write_summary_csv};
use lipitest_report::html::write_html_report;

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

pub struct RunArgs {
    pub corpus: Option<PathBuf>,
    pub text: Option<String>,
    pub max_lines: Option<usize>,
    pub systems: Option<String>,
    pub scripts: Option<String>,
    pub parallelism: Option<usize>,
    pub output: Option<PathBuf>,
    pub format: String,
    pub max_diffs: Option<usize>,
    pub verbose: bool,
    pub config: Option<PathBuf>,
}

/// Console progress reporter.
struct ConsoleReporter {
    verbose: bool,
}

impl ProgressReporter for ConsoleReporter {
    fn on_run_start(&self, spec: &SystemSpec, lines: usize) {
        eprintln!("  Starting: {} ({lines} lines)", spec.label());
    }

    fn on_line_complete(&self, _spec: &SystemSpec, result: &LineResult) {
        if self.verbose && !result.exact_match && result.failure.is_none() {
            eprintln!("{}", colored_diff(result));
        }
    }

    fn on_line_failed(&self, spec: &SystemSpec, line: usize, error: &str) {
        eprintln!("  ERROR: {} line {line}: {error}", spec.label());
    }

    fn on_run_complete(&self, run: &SystemRun, elapsed: Duration) {
        eprintln!(
            "  Done: {}/{} exact {}/{} ({:.1}s)",
            run.summary.system,
            run.summary.script,
            run.exact_matches(),
            run.summary.lines,
            elapsed.as_secs_f64()
        );
    }
}

/// Original and round trip with deletions in red and insertions in green.
fn colored_diff(result: &LineResult) -> String {
    let a: Vec<char> = result.original.chars().collect();
    let b: Vec<char> = result.round_tripped.chars().collect();
    let mut original = String::new();
    let mut converted = String::new();
    for op in char_opcodes(&result.original, &result.round_tripped) {
        let deleted: String = a[op.a_start..op.a_end].iter().collect();
        let inserted: String = b[op.b_start..op.b_end].iter().collect();
        match op.tag {
            DiffTag::Equal => {
                original.push_str(&deleted);
                converted.push_str(&inserted);
            }
            DiffTag::Delete => original.push_str(&format!("{RED}{deleted}{RESET}")),
            DiffTag::Insert => converted.push_str(&format!("{GREEN}{inserted}{RESET}")),
            DiffTag::Replace => {
                original.push_str(&format!("{RED}{deleted}{RESET}"));
                converted.push_str(&format!("{GREEN}{inserted}{RESET}"));
            }
        }
    }
    format!(
        "    line {}\n    Original IAST     : {original}\n    Script Text       : {}\n    Back-Converted    : {converted}",
        result.index + 1,
        result.forward
    )
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;

    let mut engine_config = config.engine_config();
    if let Some(p) = args.parallelism {
        anyhow::ensure!(p >= 1, "parallelism must be at least 1");
        engine_config.parallelism = p;
    }

    let source = match (&args.corpus, &args.text) {
        (Some(path), _) => CorpusSource::File {
            path: path.clone(),
            max_lines: args.max_lines,
        },
        (None, Some(text)) => CorpusSource::Text(text.clone()),
        (None, None) => CorpusSource::Sample,
    };
    let corpus = source.load()?;

    let systems = match &args.systems {
        Some(s) => split_list(s),
        None if !config.default_systems.is_empty() => config.default_systems.clone(),
        None => config.system_names(),
    };
    let scripts = match &args.scripts {
        Some(s) => split_list(s),
        None => config.default_scripts.clone(),
    };
    anyhow::ensure!(!systems.is_empty(), "no systems selected");
    anyhow::ensure!(!scripts.is_empty(), "no scripts selected");

    let specs: Vec<SystemSpec> = systems
        .iter()
        .flat_map(|system| scripts.iter().map(move |script| SystemSpec::new(system.clone(), script.clone())))
        .collect();

    let engine = EvalEngine::new(config.build_providers()?, config.script_table()?, engine_config);
    let reporter = ConsoleReporter { verbose: args.verbose };

    eprintln!(
        "lipitest v{} — {} lines from {} x {} systems x {} scripts",
        env!("CARGO_PKG_VERSION"),
        corpus.iter().filter(|l| !l.trim().is_empty()).count(),
        source.describe(),
        systems.len(),
        scripts.len()
    );
    eprintln!();

    let report = engine.run(&corpus, &specs, &reporter).await?;

    print_summary(&report);

    let output = args.output.unwrap_or_else(|| config.output_dir.clone());
    write_outputs(&report, &output, &args.format, args.max_diffs)
}

fn write_outputs(report: &EvaluationReport, output: &Path, format: &str, max_diffs: Option<usize>) -> Result<()> {
    std::fs::create_dir_all(output)?;
    let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html", "csv"]
    } else {
        format.split(',').map(str::trim).collect()
    };

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                for run in report.runs.iter().filter(|r| !r.diffs.is_empty()) {
                    let path = output.join(diff_file_name(run, "html"));
                    write_html_report(run, &path, max_diffs)?;
                    eprintln!("HTML diff report: {}", path.display());
                }
            }
            "csv" => {
                for run in &report.runs {
                    let path = output.join(diff_file_name(run, "csv"));
                    write_diff_csv(run, &path)?;
                    eprintln!("CSV diff report: {}", path.display());
                }
                let path = output.join("transliteration_summary.csv");
                write_summary_csv(report.summaries(), &path)?;
                eprintln!("Summary: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }
    Ok(())
}

fn diff_file_name(run: &SystemRun, ext: &str) -> String {
    format!("diff_{}_{}.{ext}", run.summary.system, run.summary.script)
}

fn print_summary(report: &EvaluationReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "System",
        "Script",
        "Lines",
        "Exact %",
        "Char Accuracy %",
        "Avg Edit Distance",
        "Valid Unicode %",
        "Failures",
    ]);

    for run in &report.runs {
        let s = &run.summary;
        table.add_row(vec![
            Cell::new(&s.system),
            Cell::new(&s.script),
            Cell::new(s.lines),
            Cell::new(format!("{:.1}%", s.exact_matches_percent)),
            Cell::new(format!("{:.1}%", s.char_accuracy_percent)),
            Cell::new(format!("{:.2}", s.avg_edit_distance)),
            Cell::new(format!("{:.1}%", s.valid_unicode_lines_percent)),
            Cell::new(run.failures.len()),
        ]);
    }

    eprintln!("\n{table}");
}

//! End-to-end tests of `run` and `pipeline` against the offline builtin
//! converter and a mock system declared in config.
//!
//! These tests check the files a run leaves behind, not just the exit code.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn lipitest(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("lipitest").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("LIPITEST_AKSHARAMUKHA_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn find_report(dir: &Path) -> PathBuf {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("report-") && n.ends_with(".json"))
        })
        .expect("report JSON written")
}

const MOCK_CONFIG: &str = r#"
default_scripts = ["Devanagari"]
retry_delay_ms = 1

[providers.builtin]
type = "builtin"

[providers.lossy]
type = "mock"
scripts = ["Devanagari"]

[providers.lossy.responses]
"rāmaḥ" = "रामः"
"रामः" = "rāmah"
"yogaḥ" = "योगः"
"योगः" = "yogaḥ"

[providers.lossy.failures]
"kṣa" = { kind = "unmapped", ch = "ṣ" }
"#;

#[test]
fn builtin_sample_corpus_round_trips_exactly() {
    let dir = TempDir::new().unwrap();

    lipitest(dir.path())
        .args(["run", "--output", "out", "--format", "all"])
        .assert()
        .success()
        .stderr(predicate::str::contains("builtin"))
        .stderr(predicate::str::contains("100.0%"));

    let out = dir.path().join("out");
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(find_report(&out)).unwrap()).unwrap();
    let summary = &report["runs"][0]["summary"];
    assert_eq!(summary["System"], "builtin");
    assert_eq!(summary["Script"], "Devanagari");
    assert_eq!(summary["Lines"], 5);
    assert_eq!(summary["ExactMatchesPercent"], 100.0);
    assert_eq!(summary["ValidUnicodeLinesPercent"], 100.0);
    assert_eq!(report["corpus_lines"], 5);

    // no differences, so no HTML page but still an (empty) CSV
    assert!(!out.join("diff_builtin_Devanagari.html").exists());
    let csv = std::fs::read_to_string(out.join("diff_builtin_Devanagari.csv")).unwrap();
    assert_eq!(csv, "Original IAST,Script Text,Back-Converted IAST\n");

    let summary_csv = std::fs::read_to_string(out.join("transliteration_summary.csv")).unwrap();
    assert!(summary_csv.starts_with("Script,System,Lines,"));
    assert!(summary_csv.contains("Devanagari,builtin,5,100.0,100.0,0.0,100.0"));
}

#[test]
fn lossy_system_produces_diffs_and_failures() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("lipitest.toml"), MOCK_CONFIG).unwrap();
    std::fs::write(dir.path().join("corpus.txt"), "rāmaḥ\n\nyogaḥ\nkṣa\n").unwrap();

    lipitest(dir.path())
        .args([
            "run",
            "--corpus",
            "corpus.txt",
            "--systems",
            "lossy,builtin",
            "--output",
            "out",
            "--format",
            "json,html,csv",
            "--verbose",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("ERROR: lossy/Devanagari line 4"))
        .stderr(predicate::str::contains("Back-Converted"));

    let out = dir.path().join("out");
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(find_report(&out)).unwrap()).unwrap();

    // runs keep the requested order
    assert_eq!(report["runs"][0]["summary"]["System"], "lossy");
    assert_eq!(report["runs"][1]["summary"]["System"], "builtin");

    let lossy = &report["runs"][0];
    assert_eq!(lossy["summary"]["Lines"], 3);
    assert_eq!(lossy["failures"][0]["line"], 4);
    assert_eq!(lossy["diffs"][0]["original"], "rāmaḥ");
    assert_eq!(lossy["diffs"][0]["roundtrip"], "rāmah");

    let html = std::fs::read_to_string(out.join("diff_lossy_Devanagari.html")).unwrap();
    assert!(html.contains("<span class=\"delete\">ḥ</span>"));
    assert!(html.contains("<span class=\"insert\">h</span>"));

    let csv = std::fs::read_to_string(out.join("diff_lossy_Devanagari.csv")).unwrap();
    assert!(csv.contains("\"rāmaḥ\",\"रामः\",\"rāmah\""));
}

#[test]
fn unsupported_script_for_system_is_rejected_up_front() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("lipitest.toml"), MOCK_CONFIG).unwrap();

    lipitest(dir.path())
        .args(["run", "--systems", "lossy", "--scripts", "Telugu", "--output", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not support script 'Telugu'"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn direct_html_table_input() {
    let dir = TempDir::new().unwrap();
    let table = "<table><tr><th>Original IAST</th></tr>\
                 <tr><td>dharma&#7717;</td><td>x</td></tr>\
                 <tr><td><b>yoga</b></td></tr></table>";

    lipitest(dir.path())
        .args(["run", "--text", table, "--scripts", "Telugu", "--output", "out", "--format", "json"])
        .assert()
        .success();

    let report: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(find_report(&dir.path().join("out"))).unwrap(),
    )
    .unwrap();
    assert_eq!(report["corpus_lines"], 2);
    assert_eq!(report["runs"][0]["summary"]["ExactMatchesPercent"], 100.0);
}

#[test]
fn pipeline_writes_all_three_files() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("text.txt"), "dharmaḥ prajñā\nśāstra\n").unwrap();

    lipitest(dir.path())
        .args(["pipeline", "--input", "text.txt", "--script", "Kannada", "--output-dir", "work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Similarity ratio: 1.0000"));

    let work = dir.path().join("work");
    let native = std::fs::read_to_string(work.join("text.Kannada.txt")).unwrap();
    assert!(native.starts_with("ಧರ್ಮಃ"));
    let back = std::fs::read_to_string(work.join("text.roundtrip.txt")).unwrap();
    assert_eq!(back, "dharmaḥ prajñā\nśāstra\n");
    assert!(work.join("text.comparison.log").exists());
}

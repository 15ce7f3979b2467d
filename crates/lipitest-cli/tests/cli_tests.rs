//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated from any user or project config.
fn lipitest(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("lipitest").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("LIPITEST_AKSHARAMUKHA_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    lipitest(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Round-trip transliteration fidelity harness"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    lipitest(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lipitest"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    lipitest(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created lipitest.toml"))
        .stdout(predicate::str::contains("Created corpus/sample.txt"));

    assert!(dir.path().join("lipitest.toml").exists());
    let sample = std::fs::read_to_string(dir.path().join("corpus/sample.txt")).unwrap();
    assert!(sample.starts_with("dharmaḥ\n"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    lipitest(dir.path()).arg("init").assert().success();

    lipitest(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn list_systems_defaults_to_builtin() {
    let dir = TempDir::new().unwrap();
    lipitest(dir.path())
        .arg("list-systems")
        .assert()
        .success()
        .stdout(predicate::str::contains("System: builtin"))
        .stdout(predicate::str::contains("Devanagari (U+0900..U+097F)"));
}

#[test]
fn missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    lipitest(dir.path())
        .args(["list-systems", "--config", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: config file not found"));
}

#[test]
fn run_rejects_unknown_system() {
    let dir = TempDir::new().unwrap();
    lipitest(dir.path())
        .args(["run", "--systems", "nonesuch", "--format", "json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown system 'nonesuch'"));
    assert!(!dir.path().join("lipitest-results").exists());
}

#[test]
fn run_rejects_unknown_script() {
    let dir = TempDir::new().unwrap();
    lipitest(dir.path())
        .args(["run", "--scripts", "Klingon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown script 'Klingon'"));
}

#[test]
fn run_rejects_zero_parallelism() {
    let dir = TempDir::new().unwrap();
    lipitest(dir.path())
        .args(["run", "--parallelism", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("parallelism must be at least 1"));
}

#[test]
fn compare_writes_log() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), "rāmaḥ yogaḥ\n").unwrap();
    std::fs::write(dir.path().join("b.txt"), "rāmah yogaḥ\n").unwrap();

    lipitest(dir.path())
        .args(["compare", "a.txt", "b.txt", "--log", "out.log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Original length: 11 characters"))
        .stdout(predicate::str::contains("Character difference: 0 characters"))
        .stdout(predicate::str::contains("Lost: ḥ(2)"));

    let log = std::fs::read_to_string(dir.path().join("out.log")).unwrap();
    assert!(log.contains("SUMMARY"));
    assert!(log.contains("Similarity ratio: "));
}

#[test]
fn compare_empty_input_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), "").unwrap();
    std::fs::write(dir.path().join("b.txt"), "rāma\n").unwrap();

    lipitest(dir.path())
        .args(["compare", "a.txt", "b.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("original text is empty"));
    assert!(!dir.path().join("comparison_log.txt").exists());
}

#[test]
fn compare_reports_invalid_utf8_offset() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), b"ab\xffcd").unwrap();
    std::fs::write(dir.path().join("b.txt"), "abcd").unwrap();

    lipitest(dir.path())
        .args(["compare", "a.txt", "b.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a.txt"))
        .stderr(predicate::str::contains("2"));
}

#[test]
fn transliterate_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("in.txt"), "dharmaḥ\n\nyogaḥ\n").unwrap();

    lipitest(dir.path())
        .args(["transliterate", "--input", "in.txt", "--output", "out.txt", "--to", "Devanagari"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transliterated 3 lines"));

    let out = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
    assert_eq!(out, "धर्मः\n\nयोगः\n");
}

#[test]
fn transliterate_failure_names_the_line() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("in.txt"), "dharmaḥ\nzebra\n").unwrap();

    lipitest(dir.path())
        .args(["transliterate", "--input", "in.txt", "--output", "out.txt", "--to", "Devanagari"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("in.txt:2"))
        .stderr(predicate::str::contains("no mapping for 'z'"));
    assert!(!dir.path().join("out.txt").exists());
}

#[test]
fn dataset_dedup() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("in.txt"),
        "dharmaḥ\nrāmaḥ\n\n  dharmaḥ \nyogaḥ\nrāmaḥ\ndharmaḥ\n",
    )
    .unwrap();

    lipitest(dir.path())
        .args(["dataset", "dedup", "in.txt", "--output", "out.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Duplicates removed: 3"))
        .stdout(predicate::str::contains("'dharmaḥ' x3 (lines 4, 7)"));

    let out = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
    assert_eq!(out, "dharmaḥ\nrāmaḥ\n\nyogaḥ\n");
}

#[test]
fn dataset_check_duplicates() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("in.txt"), "a\nb\nc\n").unwrap();

    lipitest(dir.path())
        .args(["dataset", "check-duplicates", "in.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No duplicates found"));
}

#[test]
fn dataset_check_iast_with_csv() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("in.txt"), "dharmaḥ\nçiva\n").unwrap();

    lipitest(dir.path())
        .args(["dataset", "check-iast", "in.txt", "--csv", "issues.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lines with issues: 1 (50.0%)"))
        .stdout(predicate::str::contains("suggestion: śiva"));

    let csv = std::fs::read_to_string(dir.path().join("issues.csv")).unwrap();
    assert!(csv.contains("invalid_char:ç"));
}

#[test]
fn dataset_clean_iast() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("in.txt"), "kṛṣṇá   rāma\n\n  \nçiva\n").unwrap();

    lipitest(dir.path())
        .args(["dataset", "clean-iast", "in.txt", "--output", "clean.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Empty lines removed: 2"));

    let out = std::fs::read_to_string(dir.path().join("clean.txt")).unwrap();
    assert_eq!(out, "kṛṣṇā rāma\nśiva\n");
}

//! The `lipitest pipeline` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use lipitest_core::compare::{compare_files, CompareOptions};
use lipitest_providers::config::load_config_from;

use super::compare::print_result;
use super::provider_for;
use super::transliterate::transliterate_file;

/// Source → script → source, then the whole-text comparison.
pub async fn execute(
    input: PathBuf,
    system: String,
    script: String,
    output_dir: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let provider = provider_for(&config, &system)?;
    let source = config.source_script.clone();

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    let intermediate = output_dir.join(format!("{stem}.{script}.txt"));
    let roundtrip = output_dir.join(format!("{stem}.roundtrip.txt"));
    let log = output_dir.join(format!("{stem}.comparison.log"));

    println!("Step 1: {source} -> {script}");
    transliterate_file(provider.as_ref(), &input, &intermediate, &source, &script).await?;
    println!("Step 2: {script} -> {source}");
    transliterate_file(provider.as_ref(), &intermediate, &roundtrip, &script, &source).await?;
    println!("Step 3: comparing\n");

    let options = CompareOptions {
        weights: config.scoring,
        ..CompareOptions::default()
    };
    let result = compare_files(&input, &roundtrip, &log, &options)?;
    print_result(&result);

    println!("\nIntermediate: {}", intermediate.display());
    println!("Round trip:   {}", roundtrip.display());
    println!("Log:          {}", log.display());
    Ok(())
}

//! The `lipitest transliterate` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use lipitest_core::atomic::write_atomic;
use lipitest_core::corpus::read_text;
use lipitest_core::traits::{TransliterateRequest, TransliterationProvider};
use lipitest_providers::config::load_config_from;

use super::provider_for;

/// Transliterate `input` line by line into `output`.
///
/// Blank lines are copied through. The first failing line aborts the file
/// and `output` is left untouched.
pub async fn transliterate_file(
    provider: &dyn TransliterationProvider,
    input: &Path,
    output: &Path,
    from: &str,
    to: &str,
) -> Result<usize> {
    let text = read_text(input)?;
    let mut converted = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            converted.push(line.to_string());
            continue;
        }
        let request = TransliterateRequest::new(line, from, to);
        let out = provider
            .transliterate(&request)
            .await
            .with_context(|| format!("{}:{}: {} failed", input.display(), i + 1, provider.name()))?;
        converted.push(out);
    }

    let mut body = converted.join("\n");
    body.push('\n');
    write_atomic(output, body)?;
    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        lines = converted.len(),
        "transliterated {from} -> {to}"
    );
    Ok(converted.len())
}

pub async fn execute(
    input: PathBuf,
    output: PathBuf,
    system: String,
    from: Option<String>,
    to: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let provider = provider_for(&config, &system)?;
    let from = from.unwrap_or_else(|| config.source_script.clone());

    let lines = transliterate_file(provider.as_ref(), &input, &output, &from, &to).await?;
    println!("Transliterated {lines} lines ({from} -> {to}) to {}", output.display());
    Ok(())
}

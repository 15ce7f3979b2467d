//! The `lipitest compare` command.

use std::path::PathBuf;

use anyhow::Result;

use lipitest_core::compare::{compare_files, CompareOptions, ComparisonResult};
use lipitest_providers::config::load_config_from;

pub fn execute(original: PathBuf, transliterated: PathBuf, log: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let options = CompareOptions {
        weights: config.scoring,
        ..CompareOptions::default()
    };

    let result = compare_files(&original, &transliterated, &log, &options)?;
    print_result(&result);
    println!("\nComparison log: {}", log.display());
    Ok(())
}

pub fn print_result(result: &ComparisonResult) {
    println!("Original length: {} characters", result.original_length);
    println!("Transliterated length: {} characters", result.transliterated_length);
    println!("Character difference: {} characters", result.character_difference);
    println!("Similarity ratio: {:.4}", result.similarity_ratio);
    println!("Character set similarity: {:.4}", result.character_set_similarity);

    if !result.lost_characters.is_empty() {
        let lost: Vec<String> = result
            .lost_characters
            .iter()
            .map(|c| format!("{}({})", c.ch, c.count))
            .collect();
        println!("Lost: {}", lost.join(" "));
    }
    if !result.added_characters.is_empty() {
        let added: Vec<String> = result
            .added_characters
            .iter()
            .map(|c| format!("{}({})", c.ch, c.count))
            .collect();
        println!("Added: {}", added.join(" "));
    }
}

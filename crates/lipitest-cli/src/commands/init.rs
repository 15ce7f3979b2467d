//! The `lipitest init` command.

use std::path::Path;

use anyhow::Result;

use lipitest_core::corpus::SAMPLE_CORPUS;
use lipitest_providers::config::CONFIG_TEMPLATE;

pub fn execute() -> Result<()> {
    if Path::new("lipitest.toml").exists() {
        println!("lipitest.toml already exists, skipping.");
    } else {
        std::fs::write("lipitest.toml", CONFIG_TEMPLATE)?;
        println!("Created lipitest.toml");
    }

    std::fs::create_dir_all("corpus")?;
    let sample = Path::new("corpus/sample.txt");
    if sample.exists() {
        println!("corpus/sample.txt already exists, skipping.");
    } else {
        let mut body = SAMPLE_CORPUS.join("\n");
        body.push('\n');
        std::fs::write(sample, body)?;
        println!("Created corpus/sample.txt");
    }

    println!("\nNext steps:");
    println!("  1. Edit lipitest.toml to add systems and scripts");
    println!("  2. Run: lipitest list-systems");
    println!("  3. Run: lipitest run --corpus corpus/sample.txt");

    Ok(())
}

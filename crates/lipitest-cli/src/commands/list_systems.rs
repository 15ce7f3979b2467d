//! The `lipitest list-systems` command.

use std::path::PathBuf;

use anyhow::Result;

use lipitest_providers::config::load_config_from;

use super::provider_for;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let table = config.script_table()?;

    let names = config.system_names();
    if names.is_empty() {
        println!("No systems configured. Run `lipitest init` to create a config file.");
        return Ok(());
    }

    for name in &names {
        let provider = provider_for(&config, name)?;
        println!("System: {name}");
        for script in provider.supported_scripts() {
            let block = match table.get(&script) {
                Some(b) => format!("U+{:04X}..U+{:04X}", b.low, b.high),
                None => "no block configured".to_string(),
            };
            println!("  {script} ({block})");
        }
        println!();
    }

    Ok(())
}

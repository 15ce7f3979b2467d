pub mod compare;
pub mod dataset;
pub mod init;
pub mod list_systems;
pub mod pipeline;
pub mod run;
pub mod transliterate;

use std::sync::Arc;

use anyhow::Result;

use lipitest_core::traits::TransliterationProvider;
use lipitest_providers::{create_provider, LipitestConfig};

/// Instantiate a single configured system by name.
pub fn provider_for(config: &LipitestConfig, system: &str) -> Result<Arc<dyn TransliterationProvider>> {
    match config.providers.get(system) {
        Some(pconfig) => create_provider(system, pconfig),
        None => anyhow::bail!(
            "system '{}' not found in config. Available: {}",
            system,
            config.system_names().join(", ")
        ),
    }
}

//! Provider configuration and factory.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use lipitest_core::engine::EvalEngineConfig;
use lipitest_core::script::{ScriptTable, UnicodeBlock, IAST};
use lipitest_core::similarity::ScoringWeights;
use lipitest_core::traits::TransliterationProvider;

use crate::aksharamukha::{AksharamukhaProvider, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::builtin::BuiltinProvider;
use crate::mock::{MockFailure, MockProvider};

/// Configuration for a single transliteration system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Builtin {},
    Aksharamukha {
        #[serde(default = "default_aksharamukha_url")]
        base_url: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
        /// Restrict the advertised scripts; empty means every builtin block.
        #[serde(default)]
        scripts: Vec<String>,
    },
    Mock {
        #[serde(default)]
        scripts: Vec<String>,
        #[serde(default)]
        responses: HashMap<String, String>,
        #[serde(default)]
        failures: HashMap<String, MockFailure>,
        /// Return unlisted inputs unchanged instead of failing.
        #[serde(default)]
        echo: bool,
    },
}

fn default_aksharamukha_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Top-level lipitest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LipitestConfig {
    /// Provider configurations keyed by system name.
    #[serde(default = "default_providers")]
    pub providers: HashMap<String, ProviderConfig>,
    /// Systems evaluated when `--systems` is not given; empty means all.
    #[serde(default)]
    pub default_systems: Vec<String>,
    #[serde(default = "default_scripts")]
    pub default_scripts: Vec<String>,
    #[serde(default = "default_source_script")]
    pub source_script: String,
    /// Max lines in flight per run.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Max retries on transient provider errors.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Output directory for results.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub scoring: ScoringWeights,
    /// Extra or overriding script → `[low, high]` code point ranges.
    #[serde(default)]
    pub unicode_blocks: BTreeMap<String, UnicodeBlock>,
}

fn default_providers() -> HashMap<String, ProviderConfig> {
    HashMap::from([("builtin".to_string(), ProviderConfig::Builtin {})])
}
fn default_scripts() -> Vec<String> {
    vec!["Devanagari".to_string()]
}
fn default_source_script() -> String {
    IAST.to_string()
}
fn default_parallelism() -> usize {
    4
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    1000
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./lipitest-results")
}

impl Default for LipitestConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            default_systems: Vec::new(),
            default_scripts: default_scripts(),
            source_script: default_source_script(),
            parallelism: default_parallelism(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
            output_dir: default_output_dir(),
            scoring: ScoringWeights::default(),
            unicode_blocks: BTreeMap::new(),
        }
    }
}

impl LipitestConfig {
    pub fn engine_config(&self) -> EvalEngineConfig {
        EvalEngineConfig {
            parallelism: self.parallelism.max(1),
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            source_script: self.source_script.clone(),
        }
    }

    /// The builtin block table with `unicode_blocks` merged on top.
    pub fn script_table(&self) -> Result<ScriptTable> {
        ScriptTable::with_overrides(&self.unicode_blocks).context("invalid [unicode_blocks] entry")
    }

    /// Instantiate every configured provider.
    pub fn build_providers(&self) -> Result<HashMap<String, Arc<dyn TransliterationProvider>>> {
        self.providers
            .iter()
            .map(|(name, config)| {
                let provider = create_provider(name, config)
                    .with_context(|| format!("failed to create provider '{name}'"))?;
                Ok((name.clone(), provider))
            })
            .collect()
    }

    /// Configured system names in sorted order.
    pub fn system_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Aksharamukha {
            base_url,
            timeout_secs,
            scripts,
        } => ProviderConfig::Aksharamukha {
            base_url: resolve_env_vars(base_url),
            timeout_secs: *timeout_secs,
            scripts: scripts.iter().map(|s| resolve_env_vars(s)).collect(),
        },
        other => other.clone(),
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `lipitest.toml` in the current directory
/// 2. `~/.config/lipitest/config.toml`
///
/// Environment variable override: `LIPITEST_AKSHARAMUKHA_URL`.
pub fn load_config() -> Result<LipitestConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<LipitestConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("lipitest.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path().map(|home| home.join("config.toml")).filter(|p| p.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content).with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => LipitestConfig::default(),
    };

    if let Ok(url) = std::env::var("LIPITEST_AKSHARAMUKHA_URL") {
        apply_aksharamukha_override(&mut config, url);
    }

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.scoring.validate().context("invalid [scoring] weights")?;

    Ok(config)
}

/// Parse a TOML config document.
pub fn parse_config(content: &str) -> Result<LipitestConfig> {
    Ok(toml::from_str::<LipitestConfig>(content)?)
}

fn apply_aksharamukha_override(config: &mut LipitestConfig, url: String) {
    let entry = config
        .providers
        .entry("aksharamukha".into())
        .or_insert(ProviderConfig::Aksharamukha {
            base_url: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            scripts: Vec::new(),
        });
    if let ProviderConfig::Aksharamukha { base_url, .. } = entry {
        *base_url = url;
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("lipitest"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Arc<dyn TransliterationProvider>> {
    match config {
        ProviderConfig::Builtin {} => Ok(Arc::new(BuiltinProvider::new(name))),
        ProviderConfig::Aksharamukha {
            base_url,
            timeout_secs,
            scripts,
        } => Ok(Arc::new(AksharamukhaProvider::new(
            name,
            base_url,
            *timeout_secs,
            scripts.clone(),
        )?)),
        ProviderConfig::Mock {
            scripts,
            responses,
            failures,
            echo,
        } => {
            let scripts: Vec<&str> = scripts.iter().map(String::as_str).collect();
            Ok(Arc::new(
                MockProvider::new(&scripts, responses.clone())
                    .with_name(name)
                    .with_failures(failures.clone())
                    .with_echo(*echo),
            ))
        }
    }
}

/// Starter config written by `lipitest init`.
pub const CONFIG_TEMPLATE: &str = r#"# lipitest configuration

default_scripts = ["Devanagari", "Telugu"]
source_script = "IAST"
parallelism = 4
max_retries = 3
retry_delay_ms = 1000
output_dir = "./lipitest-results"

[providers.builtin]
type = "builtin"

# [providers.aksharamukha]
# type = "aksharamukha"
# base_url = "${LIPITEST_AKSHARAMUKHA_URL}"
# timeout_secs = 30

[scoring]
positional_weight = 0.7
alignment_weight = 0.3

# [unicode_blocks]
# Grantha = [0x11300, 0x1137F]
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use lipitest_core::traits::TransliterateRequest;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_LIPITEST_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_LIPITEST_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_LIPITEST_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_LIPITEST_TEST_VAR");
    }

    #[test]
    fn default_config_works_offline() {
        let config = LipitestConfig::default();
        assert_eq!(config.parallelism, 4);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.default_scripts, vec!["Devanagari"]);
        assert_eq!(config.system_names(), vec!["builtin"]);
        assert_eq!(config.engine_config().retry_delay, Duration::from_secs(1));
    }

    #[test]
    fn parse_provider_config() {
        let toml_str = r#"
default_scripts = ["Telugu"]

[providers.local]
type = "builtin"

[providers.remote]
type = "aksharamukha"
base_url = "http://localhost:8085"

[providers.fake]
type = "mock"
scripts = ["Devanagari"]
responses = { "rāma" = "राम" }
failures = { "kṣa" = { kind = "timeout" } }

[unicode_blocks]
Grantha = [0x11300, 0x1137F]
"#;
        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.providers.len(), 3);
        assert!(matches!(
            config.providers.get("remote"),
            Some(ProviderConfig::Aksharamukha { timeout_secs: 30, .. })
        ));
        assert!(config.script_table().unwrap().get("grantha").is_some());
        assert_eq!(config.build_providers().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn configured_mock_refuses_unlisted_input() {
        let config = parse_config(
            r#"
[providers.fake]
type = "mock"
scripts = ["Devanagari"]
responses = { "rāma" = "राम" }
"#,
        )
        .unwrap();
        let providers = config.build_providers().unwrap();
        let fake = &providers["fake"];

        let known = TransliterateRequest::new("rāma", "IAST", "Devanagari");
        assert_eq!(fake.transliterate(&known).await.unwrap(), "राम");
        let unknown = TransliterateRequest::new("yoga", "IAST", "Devanagari");
        assert!(fake.transliterate(&unknown).await.is_err());
    }

    #[test]
    fn template_parses() {
        let config = parse_config(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.default_scripts, vec!["Devanagari", "Telugu"]);
        assert_eq!(config.scoring, ScoringWeights::default());
    }

    #[test]
    fn aksharamukha_override_creates_provider() {
        let mut config = LipitestConfig::default();
        apply_aksharamukha_override(&mut config, "http://mirror:8080".into());
        assert!(matches!(
            config.providers.get("aksharamukha"),
            Some(ProviderConfig::Aksharamukha { base_url, .. }) if base_url == "http://mirror:8080"
        ));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/lipitest.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn rejects_bad_weights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lipitest.toml");
        std::fs::write(&path, "[scoring]\npositional_weight = -1.0\n").unwrap();
        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("scoring"));
    }
}

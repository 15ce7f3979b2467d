//! lipitest-providers — transliteration system integrations.
//!
//! Implements the `TransliterationProvider` trait for the offline builtin
//! converter, the Aksharamukha HTTP API and a table-driven mock, and loads
//! the TOML configuration that selects between them.

pub mod aksharamukha;
pub mod builtin;
pub mod config;
pub mod mock;

pub use config::{create_provider, load_config, load_config_from, LipitestConfig, ProviderConfig};
pub use lipitest_core::error::ProviderError;

//! Core trait definitions for transliteration providers.
//!
//! Implemented by the `lipitest-providers` crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A backend that converts text between scripts.
///
/// Failures must be returned as errors, preferably
/// [`ProviderError`](crate::error::ProviderError) so the engine can tell
/// permanent failures from transient ones. A provider must never hand back
/// its input unchanged to signal "not supported".
#[async_trait]
pub trait TransliterationProvider: Send + Sync {
    /// Human-readable provider name (e.g. "builtin").
    fn name(&self) -> &str;

    /// Scripts this provider can convert to and from, besides IAST.
    fn supported_scripts(&self) -> Vec<String>;

    /// Convert `request.text` from the source to the target script.
    async fn transliterate(&self, request: &TransliterateRequest) -> anyhow::Result<String>;
}

/// Request to convert a piece of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransliterateRequest {
    pub text: String,
    pub source_script: String,
    pub target_script: String,
}

impl TransliterateRequest {
    pub fn new(text: impl Into<String>, source_script: impl Into<String>, target_script: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_script: source_script.into(),
            target_script: target_script.into(),
        }
    }

    /// The same text sent in the opposite direction.
    pub fn reversed(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_script: self.target_script.clone(),
            target_script: self.source_script.clone(),
        }
    }
}

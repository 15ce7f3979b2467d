//! Error types shared across the workspace.
//!
//! `ProviderError` is defined here rather than in `lipitest-providers` so the
//! evaluation engine can downcast and classify failures for retry decisions
//! without string matching.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when asking a provider to transliterate text.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider refuses this script pair. Returned instead of echoing the
    /// input so an unsupported pair is never scored as an exact round trip.
    #[error("{system} does not support {source_script} -> {target_script}")]
    Unsupported {
        system: String,
        source_script: String,
        target_script: String,
    },

    /// A character has no representation in the target script.
    #[error("no mapping for {ch:?} (U+{:04X}) in {script}", *.ch as u32)]
    UnmappedCharacter { ch: char, script: String },

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The provider answered with something that is not a transliteration.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Returns `true` if this error is permanent and should not be retried.
    pub fn is_permanent(&self) -> bool {
        match self {
            ProviderError::Unsupported { .. }
            | ProviderError::UnmappedCharacter { .. }
            | ProviderError::InvalidResponse(_) => true,
            // 4xx other than rate limiting will not change on retry
            ProviderError::ApiError { status, .. } => (400..500).contains(status) && *status != 429,
            ProviderError::Timeout(_) | ProviderError::NetworkError(_) => false,
        }
    }
}

/// Whole-text comparison failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    /// One side of the comparison is empty.
    #[error("cannot compare: {side} text is empty")]
    EmptyInput { side: Side },
}

/// Which text of a comparison pair an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Original,
    Transliterated,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Original => f.write_str("original"),
            Side::Transliterated => f.write_str("transliterated"),
        }
    }
}

/// A source file could not be read as text.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8 (invalid byte at offset {offset})", path.display())]
    Encoding { path: PathBuf, offset: usize },
}

//! Mock provider for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use lipitest_core::error::ProviderError;
use lipitest_core::traits::{TransliterateRequest, TransliterationProvider};

/// Failure a [`MockProvider`] raises for a given input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MockFailure {
    Timeout,
    Network,
    Api { status: u16 },
    Unmapped { ch: char },
}

impl MockFailure {
    fn to_error(&self, script: &str) -> ProviderError {
        match self {
            MockFailure::Timeout => ProviderError::Timeout(1),
            MockFailure::Network => ProviderError::NetworkError("mock connection reset".into()),
            MockFailure::Api { status } => ProviderError::ApiError {
                status: *status,
                message: "mock failure".into(),
            },
            MockFailure::Unmapped { ch } => ProviderError::UnmappedCharacter {
                ch: *ch,
                script: script.to_string(),
            },
        }
    }
}

/// A table-driven provider for testing the engine without a real backend.
///
/// Inputs found in the table map to their entry. Anything else is an
/// `InvalidResponse` error unless echoing was switched on with
/// [`MockProvider::with_echo`].
pub struct MockProvider {
    name: String,
    scripts: Vec<String>,
    /// Map of input text → output text.
    responses: HashMap<String, String>,
    failures: HashMap<String, MockFailure>,
    echo_unknown: bool,
    /// Calls that fail with a network error before the table is consulted.
    transient_failures: AtomicU32,
    call_count: AtomicU32,
    last_request: Mutex<Option<TransliterateRequest>>,
}

impl MockProvider {
    pub fn new(scripts: &[&str], responses: HashMap<String, String>) -> Self {
        Self {
            name: "mock".to_string(),
            scripts: scripts.iter().map(|s| s.to_string()).collect(),
            responses,
            failures: HashMap::new(),
            echo_unknown: false,
            transient_failures: AtomicU32::new(0),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Register each `(source, native)` pair in both directions.
    pub fn round_trip(scripts: &[&str], pairs: &[(&str, &str)]) -> Self {
        let mut responses = HashMap::new();
        for (source, native) in pairs {
            responses.insert(source.to_string(), native.to_string());
            responses.entry(native.to_string()).or_insert_with(|| source.to_string());
        }
        Self::new(scripts, responses)
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Fail every call whose input is `text`.
    pub fn with_failure(mut self, text: &str, failure: MockFailure) -> Self {
        self.failures.insert(text.to_string(), failure);
        self
    }

    pub fn with_failures(mut self, failures: HashMap<String, MockFailure>) -> Self {
        self.failures.extend(failures);
        self
    }

    /// Return inputs missing from the table unchanged.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo_unknown = echo;
        self
    }

    /// Fail the next `n` calls with a network error.
    pub fn with_transient_failures(self, n: u32) -> Self {
        self.transient_failures.store(n, Ordering::Relaxed);
        self
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<TransliterateRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }
}

#[async_trait]
impl TransliterationProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_scripts(&self) -> Vec<String> {
        self.scripts.clone()
    }

    async fn transliterate(&self, request: &TransliterateRequest) -> anyhow::Result<String> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        let pending = self
            .transient_failures
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
        if pending.is_ok() {
            return Err(MockFailure::Network.to_error(&request.target_script).into());
        }
        if let Some(failure) = self.failures.get(&request.text) {
            return Err(failure.to_error(&request.target_script).into());
        }

        match self.responses.get(&request.text) {
            Some(out) => Ok(out.clone()),
            None if self.echo_unknown => Ok(request.text.clone()),
            None => Err(ProviderError::InvalidResponse(format!(
                "no mock entry for {:?} ({} -> {})",
                request.text, request.source_script, request.target_script
            ))
            .into()),
        }
    }
}

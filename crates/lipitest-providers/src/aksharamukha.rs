//! Aksharamukha (remote transliteration API) provider implementation.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tracing::instrument;

use lipitest_core::error::ProviderError;
use lipitest_core::script::ScriptTable;
use lipitest_core::traits::{TransliterateRequest, TransliterationProvider};

pub const DEFAULT_BASE_URL: &str = "https://aksharamukha-plugin.appspot.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Provider calling the public Aksharamukha HTTP endpoint.
pub struct AksharamukhaProvider {
    name: String,
    base_url: String,
    timeout_secs: u64,
    scripts: Vec<String>,
    client: reqwest::Client,
}

impl AksharamukhaProvider {
    /// Build a provider. An empty `base_url` selects the public service, an
    /// empty `scripts` list every script of the builtin block table.
    pub fn new(name: &str, base_url: &str, timeout_secs: u64, scripts: Vec<String>) -> anyhow::Result<Self> {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };
        let scripts = if scripts.is_empty() {
            ScriptTable::builtin().names().map(str::to_string).collect()
        } else {
            scripts
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            name: name.to_string(),
            base_url: base.trim_end_matches('/').to_string(),
            timeout_secs,
            scripts,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TransliterationProvider for AksharamukhaProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_scripts(&self) -> Vec<String> {
        self.scripts.clone()
    }

    #[instrument(skip(self, request), fields(from = %request.source_script, to = %request.target_script))]
    async fn transliterate(&self, request: &TransliterateRequest) -> anyhow::Result<String> {
        if request.text.trim().is_empty() {
            return Ok(request.text.clone());
        }

        let url = reqwest::Url::parse_with_params(
            &format!("{}/api/public", self.base_url),
            &[
                ("source", request.source_script.as_str()),
                ("target", request.target_script.as_str()),
                ("text", request.text.as_str()),
            ],
        )
        .with_context(|| format!("invalid base URL: {}", self.base_url))?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                ProviderError::NetworkError(format!("Aksharamukha not reachable at {}", self.base_url))
            } else {
                ProviderError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("failed to read body: {e}")))?;
        if text.trim().is_empty() {
            return Err(ProviderError::InvalidResponse(format!(
                "empty body for {} -> {}",
                request.source_script, request.target_script
            ))
            .into());
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> AksharamukhaProvider {
        AksharamukhaProvider::new("aksharamukha", &server.uri(), 5, vec![]).unwrap()
    }

    #[tokio::test]
    async fn successful_transliteration() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/public"))
            .and(query_param("source", "IAST"))
            .and(query_param("target", "Devanagari"))
            .and(query_param("text", "rāmaḥ"))
            .respond_with(ResponseTemplate::new(200).set_body_string("रामः"))
            .mount(&server)
            .await;

        let out = provider(&server)
            .transliterate(&TransliterateRequest::new("rāmaḥ", "IAST", "Devanagari"))
            .await
            .unwrap();
        assert_eq!(out, "रामः");
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/public"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .transliterate(&TransliterateRequest::new("yoga", "IAST", "Telugu"))
            .await
            .unwrap_err();
        let err = err.downcast::<ProviderError>().unwrap();
        assert!(matches!(err, ProviderError::ApiError { status: 503, .. }));
        assert!(!err.is_permanent());
    }

    #[tokio::test]
    async fn empty_body_is_invalid() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/public"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&server)
            .await;

        let err = provider(&server)
            .transliterate(&TransliterateRequest::new("yoga", "IAST", "Telugu"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid response"));
    }

    #[tokio::test]
    async fn blank_input_skips_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let out = provider(&server)
            .transliterate(&TransliterateRequest::new("  ", "IAST", "Telugu"))
            .await
            .unwrap();
        assert_eq!(out, "  ");
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        let provider = AksharamukhaProvider::new("aksharamukha", "http://127.0.0.1:1", 5, vec![]).unwrap();
        let err = provider
            .transliterate(&TransliterateRequest::new("yoga", "IAST", "Telugu"))
            .await
            .unwrap_err();
        let err = err.downcast::<ProviderError>().unwrap();
        assert!(matches!(err, ProviderError::NetworkError(_)));
    }

    #[test]
    fn defaults_to_builtin_scripts() {
        let provider = AksharamukhaProvider::new("a", "", 5, vec![]).unwrap();
        assert_eq!(provider.base_url(), DEFAULT_BASE_URL);
        assert!(provider.supported_scripts().iter().any(|s| s == "Sharada"));
    }
}

//! MBTA V3 HTTP client.
//!
//! A thin GET wrapper: adds the static `x-api-key` header, maps HTTP
//! failures onto [`FetchError`] and deserializes the JSON:API body. No
//! retries; a failed call is reported once and the next refresh starts
//! fresh.

use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use super::error::FetchError;
use super::request::FeedRequest;
use super::types::{ErrorBody, RawPayload};

/// Default base URL for the V3 API.
const DEFAULT_BASE_URL: &str = "https://api-v3.mbta.com";

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Configuration for the MBTA client.
#[derive(Debug, Clone)]
pub struct MbtaConfig {
    /// API key sent as `x-api-key`. Without one every fetch fails fast.
    pub api_key: Option<String>,
    /// Base URL for the API (defaults to production V3)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl MbtaConfig {
    /// Create a new config with the given API key.
    ///
    /// Empty keys are treated as missing.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// MBTA V3 API client.
#[derive(Debug, Clone)]
pub struct MbtaClient {
    http: reqwest::Client,
    base_url: String,
    has_key: bool,
}

impl MbtaClient {
    /// Create a new client with the given configuration.
    pub fn new(config: MbtaConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();

        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key).map_err(|_| FetchError::Api {
                status: 0,
                message: "Invalid API key format".to_string(),
            })?;
            headers.insert("x-api-key", value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            has_key: config.api_key.is_some(),
        })
    }

    /// Whether an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.has_key
    }

    /// Fetch one resource collection.
    pub async fn fetch(&self, request: &FeedRequest) -> Result<RawPayload, FetchError> {
        if !self.has_key {
            return Err(FetchError::MissingApiKey);
        }

        let url = format!("{}{}", self.base_url, request.kind.path());
        debug!(%request, "fetching");

        let response = self.http.get(&url).query(&request.query()).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            warn!(%request, %status, "MBTA API rejected the key");
            return Err(FetchError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!(%request, "rate limited");
            return Err(FetchError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.first_message())
                .unwrap_or_else(|| body.chars().take(200).collect());
            warn!(%request, %status, %message, "MBTA API error");
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;

        parse_payload(&body)
    }
}

/// Deserialize a V3 response body.
pub(crate) fn parse_payload(body: &str) -> Result<RawPayload, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(500).collect()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = MbtaConfig::new(Some("test-key".into()))
            .with_base_url("http://localhost:8080")
            .with_timeout(60);

        assert_eq!(config.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn config_defaults() {
        let config = MbtaConfig::new(Some("test-key".into()));

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn blank_key_counts_as_missing() {
        assert!(MbtaConfig::new(Some("  ".into())).api_key.is_none());
        assert!(MbtaConfig::new(None).api_key.is_none());
    }

    #[test]
    fn client_creation() {
        let client = MbtaClient::new(MbtaConfig::new(Some("test-key".into()))).unwrap();
        assert!(client.has_api_key());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = MbtaConfig::new(Some("k".into())).with_base_url("http://localhost:1/");
        let client = MbtaClient::new(config).unwrap();
        assert_eq!(client.base_url, "http://localhost:1");
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        // Unroutable base URL: a real request would error with Http, not MissingApiKey.
        let config = MbtaConfig::new(None).with_base_url("http://127.0.0.1:9");
        let client = MbtaClient::new(config).unwrap();

        let result = client.fetch(&FeedRequest::alerts("Red")).await;

        assert!(matches!(result, Err(FetchError::MissingApiKey)));
    }

    #[test]
    fn parse_payload_reports_body_prefix() {
        let err = parse_payload("<html>oops</html>").unwrap_err();
        match err {
            FetchError::Json { body, .. } => assert_eq!(body.as_deref(), Some("<html>oops</html>")),
            other => panic!("unexpected error: {other}"),
        }
    }

    // Live tests need a real key and network access; they belong behind
    // #[ignore] and are not part of the default suite.
}

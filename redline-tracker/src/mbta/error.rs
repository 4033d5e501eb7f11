//! MBTA client error types.

/// Errors from fetching a V3 API resource.
///
/// Every variant renders as a single human-readable message; the dashboard
/// shows it verbatim in its error banner.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// No API key configured. No request is made.
    #[error("MBTA_API_KEY is not set")]
    MissingApiKey,

    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the JSON we expected
    #[error("invalid JSON: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned a non-success status code
    #[error("API request failed: status {status}: {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the API
    #[error("rate limited by MBTA API")]
    RateLimited,

    /// Invalid API key
    #[error("unauthorized (invalid API key)")]
    Unauthorized,

    /// Mock fixture missing or unreadable
    #[error("fixture error: {0}")]
    Fixture(String),
}

impl FetchError {
    /// HTTP status code associated with the failure, when there is one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Api { status, .. } => Some(*status),
            FetchError::RateLimited => Some(429),
            FetchError::Unauthorized => Some(403),
            FetchError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

//! Ollama Cloud chat client.
//!
//! One non-streaming call per report: the whole prompt goes out as a single
//! user message and the assistant's reply comes back as text.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default chat endpoint.
const DEFAULT_CHAT_URL: &str = "https://ollama.com/api/chat";

/// Default model.
const DEFAULT_MODEL: &str = "gpt-oss:20b-cloud";

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors from the generative text call.
#[derive(Debug, thiserror::Error)]
pub enum OllamaError {
    /// No API key configured. No request is made.
    #[error("OLLAMA_API_KEY is not set")]
    MissingApiKey,

    /// HTTP request failed (network error, timeout, etc.)
    #[error("Ollama request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status code
    #[error("Ollama API error: status {status}, body={body}")]
    Api { status: u16, body: String },

    /// The body was not a chat response
    #[error("Ollama response not valid JSON: {0}")]
    Json(String),

    /// The body parsed but held no assistant message
    #[error("Ollama response missing message.content")]
    MissingContent,
}

/// Configuration for the Ollama client.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Bearer token.
    pub api_key: Option<String>,
    /// Chat endpoint URL
    pub chat_url: String,
    /// Model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OllamaConfig {
    /// Create a new config with the given API key.
    ///
    /// Empty keys are treated as missing.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            chat_url: DEFAULT_CHAT_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom chat URL (for testing).
    pub fn with_chat_url(mut self, url: impl Into<String>) -> Self {
        self.chat_url = url.into();
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// Ollama Cloud chat client.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaClient {
    /// Create a new client with the given configuration.
    pub fn new(config: OllamaConfig) -> Result<Self, OllamaError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    /// Whether an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Send `prompt` as a single user message and return the reply text.
    pub async fn chat(&self, prompt: &str) -> Result<String, OllamaError> {
        let key = self
            .config
            .api_key
            .as_deref()
            .ok_or(OllamaError::MissingApiKey)?;

        let request = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };
        debug!(model = %self.config.model, prompt_chars = prompt.len(), "sending chat request");

        let response = self
            .http
            .post(&self.config.chat_url)
            .bearer_auth(key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(%status, "Ollama API error");
            return Err(OllamaError::Api {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        parse_reply(&body)
    }
}

/// Pull `message.content` out of a chat response body.
fn parse_reply(body: &str) -> Result<String, OllamaError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| OllamaError::Json(e.to_string()))?;

    parsed
        .message
        .and_then(|m| m.content)
        .ok_or(OllamaError::MissingContent)
}

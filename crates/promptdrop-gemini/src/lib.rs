//! promptdrop-gemini: a minimal client for Gemini's `generateContent`.
//!
//! Sends one prompt together with one file (inline, base64) and returns
//! the first text part of the answer. Streaming, multi-turn chat, and
//! structured output are out of scope.
//!
//! Built on `reqwest`, so the same client runs natively and in the
//! browser (where `reqwest` delegates to `fetch`). Timeouts are left to
//! the caller: `reqwest` has no timer on `wasm32`.

pub mod wire;

use serde::{Deserialize, Serialize};

use crate::wire::{GenerateRequest, GenerateResponse};

/// Errors returned by [`GeminiClient`].
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    /// No API key was configured.
    #[error("no Gemini API key configured")]
    MissingApiKey,

    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Gemini returned HTTP {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// The success body was not valid JSON of the expected shape.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response contained no text part.
    #[error("response contained no text{}", .reason.as_ref().map(|r| format!(" ({r})")).unwrap_or_default())]
    NoText {
        /// Block or finish reason reported by the service.
        reason: Option<String>,
    },
}

/// Connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header.
    pub api_key: String,
    /// Model name, e.g. `gemini-1.5-flash`.
    pub model: String,
    /// API base URL, without a trailing slash.
    pub endpoint: String,
}

impl GeminiConfig {
    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gemini-1.5-flash";

    /// Default API base URL.
    pub const DEFAULT_ENDPOINT: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    /// Settings with the given key and default model and endpoint.
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: Self::DEFAULT_MODEL.to_owned(),
            endpoint: Self::DEFAULT_ENDPOINT.to_owned(),
        }
    }
}

/// Client for a single model.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::MissingApiKey`] if `config.api_key` is blank.
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
        if config.api_key.trim().is_empty() {
            return Err(GeminiError::MissingApiKey);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            config,
        })
    }

    /// Model this client talks to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Full URL of the `generateContent` call.
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Ask the model about one file.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] on transport failures,
    /// [`GeminiError::Api`] on non-success statuses,
    /// [`GeminiError::Decode`] when the body is not a valid response, and
    /// [`GeminiError::NoText`] when the answer has no text part.
    #[allow(clippy::future_not_send)] // fetch-backed futures are !Send on wasm32
    pub async fn generate(&self, prompt: &str, mime: &str, bytes: &[u8]) -> Result<String, GeminiError> {
        let body = GenerateRequest::prompt_with_file(prompt, mime, bytes);
        log::debug!(
            "generateContent model={} mime={mime} bytes={}",
            self.config.model,
            bytes.len()
        );

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message: wire::error_message(&text),
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)?;
        parsed.first_text().map(str::to_owned).ok_or_else(|| GeminiError::NoText {
            reason: parsed.refusal_reason().map(str::to_owned),
        })
    }
}

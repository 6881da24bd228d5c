//! JSON shapes of the `generateContent` endpoint.
//!
//! Only the fields this client reads or writes are modelled; unknown
//! response fields are ignored.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    /// Conversation turns; this client always sends exactly one.
    pub contents: Vec<Content>,
}

impl GenerateRequest {
    /// One user turn holding the prompt and the file inline.
    #[must_use]
    pub fn prompt_with_file(prompt: &str, mime: &str, bytes: &[u8]) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_owned()),
                parts: vec![
                    Part::Text {
                        text: prompt.to_owned(),
                    },
                    Part::InlineData {
                        inline_data: Blob {
                            mime_type: mime.to_owned(),
                            data: STANDARD.encode(bytes),
                        },
                    },
                ],
            }],
        }
    }
}

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// `user` or `model`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Ordered parts of the turn.
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// One part of a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// Inline binary payload.
    InlineData {
        /// The payload.
        #[serde(rename = "inlineData", alias = "inline_data")]
        inline_data: Blob,
    },
    /// Any part kind this client does not use.
    Other(serde_json::Value),
}

/// Base64 payload with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    /// MIME type of `data`.
    #[serde(rename = "mimeType", alias = "mime_type")]
    pub mime_type: String,
    /// Standard base64.
    pub data: String,
}

/// Response body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerateResponse {
    /// Generated candidates, best first.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Present when the prompt itself was blocked.
    #[serde(default, rename = "promptFeedback")]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateResponse {
    /// Text of the first text part of the first candidate.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                Part::InlineData { .. } | Part::Other(_) => None,
            })
    }

    /// Why no text came back, as reported by the service.
    #[must_use]
    pub fn refusal_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
            .or_else(|| self.candidates.first()?.finish_reason.as_deref())
    }
}

/// One generated candidate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Candidate {
    /// The generated turn. Missing when generation was blocked.
    #[serde(default)]
    pub content: Option<Content>,
    /// `STOP`, `MAX_TOKENS`, `SAFETY`, ...
    #[serde(default, rename = "finishReason")]
    pub finish_reason: Option<String>,
}

/// Feedback about the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PromptFeedback {
    /// Set when the prompt was blocked.
    #[serde(default, rename = "blockReason")]
    pub block_reason: Option<String>,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Human-readable message from an error response body.
///
/// Falls back to the raw body when it is not the documented envelope.
#[must_use]
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            error: ErrorBody {
                message,
                status: Some(status),
            },
        }) => format!("{status}: {message}"),
        Ok(ErrorEnvelope { error }) => error.message,
        Err(_) => body.trim().to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_prompt_then_inline_file() {
        let request = GenerateRequest::prompt_with_file("Describe this image", "image/png", b"abc");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "Describe this image" },
                        { "inlineData": { "mimeType": "image/png", "data": "YWJj" } }
                    ]
                }]
            })
        );
    }

    #[test]
    fn first_text_skips_non_text_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [
                            { "inlineData": { "mimeType": "image/png", "data": "AA==" } },
                            { "text": "A red apple on a table" },
                            { "text": "ignored" }
                        ]
                    },
                    "finishReason": "STOP"
                }],
                "usageMetadata": { "totalTokenCount": 12 }
            }"#,
        )
        .unwrap();
        assert_eq!(response.first_text(), Some("A red apple on a table"));
    }

    #[test]
    fn unknown_parts_are_tolerated() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"functionCall":{"name":"f"}},{"text":"ok"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.first_text(), Some("ok"));
    }

    #[test]
    fn blocked_prompt_has_no_text_and_a_reason() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert_eq!(response.first_text(), None);
        assert_eq!(response.refusal_reason(), Some("SAFETY"));
    }

    #[test]
    fn finish_reason_is_reported_when_content_is_missing() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"RECITATION"}]}"#).unwrap();
        assert_eq!(response.first_text(), None);
        assert_eq!(response.refusal_reason(), Some("RECITATION"));
    }

    #[test]
    fn error_envelope_is_summarised() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(body), "INVALID_ARGUMENT: API key not valid.");
        assert_eq!(error_message(r#"{"error":{"message":"boom"}}"#), "boom");
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
    }
}

//! Submission request and failure types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{Epoch, FileHandle};

/// Why a submission produced no result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The model call returned an error.
    #[error("generation failed: {0}")]
    Rejected(String),

    /// The model call did not settle within the configured timeout.
    #[error("generation timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

/// Everything the host needs to perform one model call.
///
/// Only the first file of the session is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    /// Epoch the request belongs to; echo it back when settling.
    pub epoch: Epoch,
    /// Prompt text at the time of submission.
    pub prompt: String,
    /// First file in the session.
    pub file: FileHandle,
    /// How long the host should wait before settling with
    /// [`SubmitError::TimedOut`].
    pub timeout: Duration,
}

/// Submission settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitConfig {
    /// Upper bound on a single model call.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl SubmitConfig {
    /// Default model call timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

/// Serialize a [`Duration`] as whole seconds.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_seconds() {
        let err = SubmitError::TimedOut(Duration::from_secs(60));
        assert_eq!(err.to_string(), "generation timed out after 60s");
    }

    #[test]
    fn config_reads_timeout_in_seconds() {
        let config: SubmitConfig = serde_json::from_str(r#"{"timeout": 5}"#).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));

        let config: SubmitConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SubmitConfig::default());
    }
}

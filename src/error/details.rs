//! Error classification and provider error payloads.

use serde::{Deserialize, Serialize};

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    Unknown,
}

/// Structured details from an Azure OpenAI error body.
///
/// Azure wraps failures as `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub param: Option<String>,
}

impl ErrorDetails {
    /// Parse the `error` object out of a response body, if there is one.
    pub fn from_body(body: &str) -> Option<Self> {
        #[derive(Deserialize)]
        struct Envelope {
            error: ErrorDetails,
        }
        serde_json::from_str::<Envelope>(body).ok().map(|e| e.error)
    }

    /// True when Azure's content filter rejected the prompt or completion.
    pub fn is_content_filtered(&self) -> bool {
        self.code.as_deref() == Some("content_filter")
    }
}

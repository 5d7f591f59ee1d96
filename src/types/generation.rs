//! Execution settings and completion results.

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::message::ChatMessage;
use super::usage::Usage;

/// Settings controlling a chat completion.
///
/// ```
/// use sksample::types::ExecutionSettings;
///
/// let settings = ExecutionSettings::builder()
///     .temperature(0.2)
///     .max_tokens(64)
///     .build();
/// assert_eq!(settings.max_tokens, Some(64));
/// ```
#[derive(Debug, Clone, Builder, Serialize, Deserialize, Default, PartialEq)]
pub struct ExecutionSettings {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub stop_sequences: Option<Vec<String>>,
    pub presence_penalty: Option<f64>,
    pub frequency_penalty: Option<f64>,
    pub seed: Option<u64>,
    pub user: Option<String>,
}

/// Why a completion finished.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
}

/// A request to a chat-completion service.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub settings: ExecutionSettings,
}

/// A non-streaming completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    pub text: String,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

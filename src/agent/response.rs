use std::fmt;

use crate::types::{ChatMessage, FinishReason, Usage};

/// One agent reply.
///
/// `Display` renders only the message text.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentResponse {
    /// Name of the agent that produced the reply.
    pub name: String,
    pub message: ChatMessage,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

impl AgentResponse {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            message: ChatMessage::assistant(text).with_name(name.clone()),
            name,
            usage: Usage::default(),
            finish_reason: None,
        }
    }
}

impl fmt::Display for AgentResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message.content)
    }
}

use uuid::Uuid;

use crate::types::ChatMessage;

/// Conversation history shared across several agent turns.
#[derive(Debug, Clone)]
pub struct AgentThread {
    id: String,
    messages: Vec<ChatMessage>,
}

impl Default for AgentThread {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentThread {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub(crate) fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }
}

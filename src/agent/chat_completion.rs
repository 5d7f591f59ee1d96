//! Agent that answers through a single chat-completion call per turn.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tracing::debug;

use crate::error::SampleError;
use crate::provider::ChatCompletionService;
use crate::types::*;

use super::response::AgentResponse;
use super::thread::AgentThread;
use super::Agent;

/// Name and persona used to construct an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub name: String,
    pub instructions: String,
}

impl AgentConfig {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
        }
    }
}

/// A named agent whose instructions become the system message of every turn.
pub struct ChatCompletionAgent {
    name: String,
    instructions: String,
    service: Arc<dyn ChatCompletionService>,
    settings: ExecutionSettings,
}

impl ChatCompletionAgent {
    pub fn new(config: AgentConfig, service: Arc<dyn ChatCompletionService>) -> Self {
        Self {
            name: config.name,
            instructions: config.instructions,
            service,
            settings: ExecutionSettings::default(),
        }
    }

    /// Set execution settings applied to every request.
    pub fn with_settings(mut self, settings: ExecutionSettings) -> Self {
        self.settings = settings;
        self
    }

    fn build_request(&self, history: &[ChatMessage], input: &str) -> ChatRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if !self.instructions.is_empty() {
            messages.push(ChatMessage::system(self.instructions.clone()));
        }
        messages.extend(history.iter().cloned());
        messages.push(ChatMessage::user(input));
        ChatRequest {
            messages,
            settings: self.settings.clone(),
        }
    }

    async fn complete(&self, request: ChatRequest) -> Result<AgentResponse, SampleError> {
        debug!(
            agent = self.name.as_str(),
            service = self.service.service_id(),
            deployment = self.service.deployment_name(),
            "agent turn"
        );
        let completion = self.service.complete(&request).await?;
        let mut response = AgentResponse::new(self.name.clone(), completion.text);
        response.usage = completion.usage;
        response.finish_reason = completion.finish_reason;
        Ok(response)
    }

    /// Answer `messages` within `thread`, appending both turns on success.
    ///
    /// The thread is left untouched if the service call fails.
    pub async fn get_response_in_thread(
        &self,
        messages: &str,
        thread: &mut AgentThread,
    ) -> Result<AgentResponse, SampleError> {
        let request = self.build_request(thread.messages(), messages);
        let response = self.complete(request).await?;
        thread.push(ChatMessage::user(messages));
        thread.push(response.message.clone());
        Ok(response)
    }
}

#[async_trait]
impl Agent for ChatCompletionAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_response(&self, messages: &str) -> Result<AgentResponse, SampleError> {
        let request = self.build_request(&[], messages);
        self.complete(request).await
    }

    async fn invoke_stream(
        &self,
        messages: &str,
    ) -> Result<BoxStream<'static, Result<StreamDelta, SampleError>>, SampleError> {
        let request = self.build_request(&[], messages);
        self.service.complete_stream(&request).await
    }
}

//! Agents: named personas that answer messages through a chat-completion service.

pub mod chat_completion;
pub mod response;
pub mod thread;

pub use chat_completion::{AgentConfig, ChatCompletionAgent};
pub use response::AgentResponse;
pub use thread::AgentThread;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::SampleError;
use crate::types::{FinishReason, StreamDelta};

/// Anything that can answer a user message.
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    /// Answer `messages` as a single, independent user turn.
    async fn get_response(&self, messages: &str) -> Result<AgentResponse, SampleError>;

    /// Stream the answer to `messages`.
    ///
    /// Agents without native streaming yield their whole reply as one delta.
    async fn invoke_stream(
        &self,
        messages: &str,
    ) -> Result<BoxStream<'static, Result<StreamDelta, SampleError>>, SampleError> {
        let response = self.get_response(messages).await?;
        let delta = StreamDelta {
            text: response.message.content,
            finish_reason: response.finish_reason.or(Some(FinishReason::Stop)),
            usage: Some(response.usage),
        };
        Ok(Box::pin(futures::stream::once(async move { Ok(delta) })))
    }
}

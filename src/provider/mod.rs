//! Chat-completion service trait and the Azure OpenAI implementation.

pub mod azure;
pub mod http;

pub use azure::AzureChatCompletion;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::SampleError;
use crate::types::{ChatCompletion, ChatRequest, StreamDelta};

/// A hosted chat-completion backend an agent can talk to.
#[async_trait]
pub trait ChatCompletionService: Send + Sync {
    /// Identifier for logs (e.g. "azure-openai").
    fn service_id(&self) -> &str;

    /// The deployment (model) this client targets.
    fn deployment_name(&self) -> &str;

    /// Request a whole completion.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, SampleError>;

    /// Request a completion as a stream of deltas.
    async fn complete_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<BoxStream<'static, Result<StreamDelta, SampleError>>, SampleError>;
}

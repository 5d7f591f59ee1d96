//! Convenience re-exports for common use.

pub use crate::agent::{Agent, AgentConfig, AgentResponse, AgentThread, ChatCompletionAgent};
pub use crate::auth::{ApiKeyCredential, AzureCliCredential, TokenCredential};
pub use crate::config::{AzureOpenAiSettings, ClientConfig};
pub use crate::error::{Result, SampleError};
pub use crate::provider::{AzureChatCompletion, ChatCompletionService};
pub use crate::sample::{AzureSampleFactory, SampleFactory, USER_INPUTS};
pub use crate::types::{ChatMessage, ExecutionSettings, Role, Usage};

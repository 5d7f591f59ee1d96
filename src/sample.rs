//! The demo: ask an Azure OpenAI backed agent a fixed list of questions.
//!
//! [`run`] is written against [`SampleFactory`] so the three collaborators
//! (credential, chat-completion client, agent) can be swapped for fakes.

use std::io::Write;
use std::sync::Arc;

use futures::StreamExt;
use tracing::info;

use crate::agent::{Agent, AgentConfig, ChatCompletionAgent};
use crate::auth::{ApiKeyCredential, AzureCliCredential, TokenCredential};
use crate::config::{AzureOpenAiSettings, ClientConfig, ResolvedSettings};
use crate::error::SampleError;
use crate::provider::{AzureChatCompletion, ChatCompletionService};

/// Questions asked, in order.
pub const USER_INPUTS: [&str; 2] = ["Why is the sky blue?", "What is the capital of France?"];

pub const AGENT_NAME: &str = "Assistant";
pub const AGENT_INSTRUCTIONS: &str = "Answer questions about the world in one sentence.";

/// Constructors for the sample's collaborators.
pub trait SampleFactory {
    fn credential(&self) -> Result<Arc<dyn TokenCredential>, SampleError>;

    fn chat_completion(
        &self,
        config: ClientConfig,
    ) -> Result<Arc<dyn ChatCompletionService>, SampleError>;

    fn agent(
        &self,
        config: AgentConfig,
        service: Arc<dyn ChatCompletionService>,
    ) -> Result<Box<dyn Agent>, SampleError>;
}

/// Builds the real Azure collaborators.
///
/// The credential is an [`ApiKeyCredential`] when an API key is configured
/// and an [`AzureCliCredential`] otherwise.
#[derive(Clone, Default)]
pub struct AzureSampleFactory {
    api_key: Option<String>,
}

impl std::fmt::Debug for AzureSampleFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureSampleFactory")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AzureSampleFactory {
    pub fn new(settings: &AzureOpenAiSettings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
        }
    }
}

impl SampleFactory for AzureSampleFactory {
    fn credential(&self) -> Result<Arc<dyn TokenCredential>, SampleError> {
        let credential: Arc<dyn TokenCredential> = match self.api_key {
            Some(ref key) => Arc::new(ApiKeyCredential::new(key.clone())),
            None => Arc::new(AzureCliCredential::new()),
        };
        Ok(credential)
    }

    fn chat_completion(
        &self,
        config: ClientConfig,
    ) -> Result<Arc<dyn ChatCompletionService>, SampleError> {
        Ok(Arc::new(AzureChatCompletion::new(config)?))
    }

    fn agent(
        &self,
        config: AgentConfig,
        service: Arc<dyn ChatCompletionService>,
    ) -> Result<Box<dyn Agent>, SampleError> {
        Ok(Box::new(ChatCompletionAgent::new(config, service)))
    }
}

fn build_agent<F>(factory: &F, settings: &ResolvedSettings) -> Result<Box<dyn Agent>, SampleError>
where
    F: SampleFactory + ?Sized,
{
    let credential = factory.credential()?;
    let service = factory.chat_completion(ClientConfig::new(credential, settings.clone()))?;
    factory.agent(AgentConfig::new(AGENT_NAME, AGENT_INSTRUCTIONS), service)
}

/// Ask every question in [`USER_INPUTS`] and write each exchange to `out`.
///
/// Questions are answered one at a time, in order. The first error stops the
/// run and is returned as-is.
pub async fn run<F, W>(factory: &F, settings: &ResolvedSettings, out: &mut W) -> Result<(), SampleError>
where
    F: SampleFactory + ?Sized,
    W: Write,
{
    let agent = build_agent(factory, settings)?;
    info!(agent = agent.name(), deployment = settings.deployment_name.as_str(), "sample started");

    for user_input in USER_INPUTS {
        writeln!(out, "# User: {user_input}")?;
        let response = agent.get_response(user_input).await?;
        writeln!(out, "# {}: {response}", response.name)?;
    }
    Ok(())
}

/// Like [`run`], but prints each answer as it streams in.
pub async fn run_streaming<F, W>(
    factory: &F,
    settings: &ResolvedSettings,
    out: &mut W,
) -> Result<(), SampleError>
where
    F: SampleFactory + ?Sized,
    W: Write,
{
    let agent = build_agent(factory, settings)?;
    info!(agent = agent.name(), deployment = settings.deployment_name.as_str(), "sample started (streaming)");

    for user_input in USER_INPUTS {
        writeln!(out, "# User: {user_input}")?;
        write!(out, "# {}: ", agent.name())?;
        let mut stream = agent.invoke_stream(user_input).await?;
        while let Some(delta) = stream.next().await {
            write!(out, "{}", delta?.text)?;
            out.flush()?;
        }
        writeln!(out)?;
    }
    Ok(())
}

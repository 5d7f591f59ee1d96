//! Shared fakes for the sample's collaborators.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use futures::stream::BoxStream;

use sksample::agent::{Agent, AgentConfig, AgentResponse};
use sksample::auth::{AccessToken, AuthError, TokenCredential};
use sksample::config::{ClientConfig, ResolvedSettings};
use sksample::error::SampleError;
use sksample::provider::ChatCompletionService;
use sksample::sample::SampleFactory;
use sksample::types::*;

pub const TEST_RESPONSE: &str = "This is a test response.";

pub fn test_settings() -> ResolvedSettings {
    ResolvedSettings {
        endpoint: "https://unit-test.openai.azure.com".to_string(),
        deployment_name: "gpt-4o".to_string(),
        api_version: "2024-10-21".to_string(),
    }
}

/// Credential that hands out a fixed token and counts requests.
#[derive(Default)]
pub struct FakeCredential {
    pub calls: AtomicUsize,
}

impl FakeCredential {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenCredential for FakeCredential {
    async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AccessToken::new("fake-token", Utc::now() + Duration::hours(1)))
    }
}

/// Chat-completion service that records requests and replays queued replies.
#[derive(Default)]
pub struct RecordingService {
    requests: Mutex<Vec<ChatRequest>>,
    replies: Mutex<Vec<Result<String, u16>>>,
}

impl RecordingService {
    pub fn queue_reply(&self, text: &str) {
        self.replies.lock().unwrap().push(Ok(text.to_string()));
    }

    /// Queue an API failure with the given status.
    pub fn queue_failure(&self, status: u16) {
        self.replies.lock().unwrap().push(Err(status));
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self) -> Result<String, SampleError> {
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Ok(TEST_RESPONSE.to_string());
        }
        replies
            .remove(0)
            .map_err(|status| SampleError::api(status, "queued failure"))
    }
}

#[async_trait]
impl ChatCompletionService for RecordingService {
    fn service_id(&self) -> &str {
        "recording"
    }

    fn deployment_name(&self) -> &str {
        "test-deployment"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, SampleError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(ChatCompletion {
            text: self.next_reply()?,
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
                total_tokens: 30,
            },
            finish_reason: Some(FinishReason::Stop),
        })
    }

    async fn complete_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<BoxStream<'static, Result<StreamDelta, SampleError>>, SampleError> {
        self.requests.lock().unwrap().push(request.clone());
        let text = self.next_reply()?;
        let stream = async_stream::stream! {
            for chunk in text.chars().collect::<Vec<_>>().chunks(5) {
                yield Ok(StreamDelta {
                    text: chunk.iter().collect(),
                    finish_reason: None,
                    usage: None,
                });
            }
            yield Ok(StreamDelta {
                text: String::new(),
                finish_reason: Some(FinishReason::Stop),
                usage: None,
            });
        };
        Ok(Box::pin(stream))
    }
}

/// Agent that records every `messages` argument it receives.
pub struct MockAgent {
    name: String,
    calls: Arc<Mutex<Vec<String>>>,
    fail_on_call: Option<usize>,
}

#[async_trait]
impl Agent for MockAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_response(&self, messages: &str) -> Result<AgentResponse, SampleError> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(messages.to_string());
            calls.len()
        };
        if self.fail_on_call == Some(call_number) {
            return Err(SampleError::api(500, "agent failed"));
        }
        Ok(AgentResponse::new(self.name.clone(), TEST_RESPONSE))
    }
}

/// Construction arguments seen by the chat-completion constructor.
#[derive(Debug, Clone)]
pub struct RecordedClientConfig {
    pub endpoint: String,
    pub deployment_name: String,
    pub api_version: String,
}

/// Factory that hands out fakes and records every constructor call.
#[derive(Default)]
pub struct RecordingFactory {
    credential_calls: AtomicUsize,
    credentials: Mutex<Vec<Arc<FakeCredential>>>,
    client_configs: Mutex<Vec<RecordedClientConfig>>,
    client_credentials: Mutex<Vec<Arc<dyn TokenCredential>>>,
    agent_configs: Mutex<Vec<AgentConfig>>,
    agent_calls: Arc<Mutex<Vec<String>>>,
    /// 1-based index of the `get_response` call that should fail.
    fail_on_call: Option<usize>,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    pub fn credential_calls(&self) -> usize {
        self.credential_calls.load(Ordering::SeqCst)
    }

    pub fn client_configs(&self) -> Vec<RecordedClientConfig> {
        self.client_configs.lock().unwrap().clone()
    }

    pub fn agent_configs(&self) -> Vec<AgentConfig> {
        self.agent_configs.lock().unwrap().clone()
    }

    pub fn response_messages(&self) -> Vec<String> {
        self.agent_calls.lock().unwrap().clone()
    }

    /// True if the client was built with the credential this factory created.
    pub fn client_received_created_credential(&self) -> bool {
        let created = self.credentials.lock().unwrap();
        let received = self.client_credentials.lock().unwrap();
        match (created.first(), received.first()) {
            (Some(created), Some(received)) => std::ptr::eq(
                Arc::as_ptr(created) as *const u8,
                Arc::as_ptr(received) as *const u8,
            ),
            _ => false,
        }
    }
}

impl SampleFactory for RecordingFactory {
    fn credential(&self) -> Result<Arc<dyn TokenCredential>, SampleError> {
        self.credential_calls.fetch_add(1, Ordering::SeqCst);
        let credential = Arc::new(FakeCredential::default());
        self.credentials.lock().unwrap().push(Arc::clone(&credential));
        Ok(credential as Arc<dyn TokenCredential>)
    }

    fn chat_completion(
        &self,
        config: ClientConfig,
    ) -> Result<Arc<dyn ChatCompletionService>, SampleError> {
        self.client_credentials.lock().unwrap().push(config.credential);
        self.client_configs.lock().unwrap().push(RecordedClientConfig {
            endpoint: config.endpoint,
            deployment_name: config.deployment_name,
            api_version: config.api_version,
        });
        Ok(Arc::new(RecordingService::default()))
    }

    fn agent(
        &self,
        config: AgentConfig,
        _service: Arc<dyn ChatCompletionService>,
    ) -> Result<Box<dyn Agent>, SampleError> {
        let name = config.name.clone();
        self.agent_configs.lock().unwrap().push(config);
        Ok(Box::new(MockAgent {
            name,
            calls: Arc::clone(&self.agent_calls),
            fail_on_call: self.fail_on_call,
        }))
    }
}

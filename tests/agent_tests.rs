//! Tests for ChatCompletionAgent using a recording service.

mod common;

use std::sync::Arc;

use common::{RecordingService, TEST_RESPONSE};
use futures::StreamExt;
use sksample::agent::{Agent, AgentConfig, AgentThread, ChatCompletionAgent};
use sksample::error::SampleError;
use sksample::types::*;

fn agent_with(service: Arc<RecordingService>) -> ChatCompletionAgent {
    ChatCompletionAgent::new(
        AgentConfig::new("Assistant", "Answer questions about the world in one sentence."),
        service,
    )
}

#[tokio::test]
async fn sends_instructions_then_user_message() {
    let service = Arc::new(RecordingService::default());
    service.queue_reply("Rayleigh scattering makes the sky blue.");
    let agent = agent_with(Arc::clone(&service));

    let response = agent.get_response("Why is the sky blue?").await.unwrap();

    assert_eq!(response.name, "Assistant");
    assert_eq!(response.to_string(), "Rayleigh scattering makes the sky blue.");
    assert_eq!(response.message.role, Role::Assistant);
    assert_eq!(response.usage.total_tokens, 30);
    assert_eq!(response.finish_reason, Some(FinishReason::Stop));

    let requests = service.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].messages,
        vec![
            ChatMessage::system("Answer questions about the world in one sentence."),
            ChatMessage::user("Why is the sky blue?"),
        ]
    );
}

#[tokio::test]
async fn get_response_is_stateless_between_calls() {
    let service = Arc::new(RecordingService::default());
    let agent = agent_with(Arc::clone(&service));

    agent.get_response("first").await.unwrap();
    agent.get_response("second").await.unwrap();

    let requests = service.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].messages.len(), 2);
    assert_eq!(requests[1].messages[1], ChatMessage::user("second"));
}

#[tokio::test]
async fn empty_instructions_send_no_system_message() {
    let service = Arc::new(RecordingService::default());
    let agent = ChatCompletionAgent::new(AgentConfig::new("Quiet", ""), service.clone());

    agent.get_response("hello").await.unwrap();

    let requests = service.requests();
    assert_eq!(requests[0].messages, vec![ChatMessage::user("hello")]);
}

#[tokio::test]
async fn settings_are_forwarded() {
    let service = Arc::new(RecordingService::default());
    let settings = ExecutionSettings::builder().max_tokens(50).temperature(0.0).build();
    let agent = agent_with(Arc::clone(&service)).with_settings(settings.clone());

    agent.get_response("hi").await.unwrap();

    assert_eq!(service.requests()[0].settings, settings);
}

#[tokio::test]
async fn thread_accumulates_history() {
    let service = Arc::new(RecordingService::default());
    service.queue_reply("Paris.");
    service.queue_reply("About 2.1 million people.");
    let agent = agent_with(Arc::clone(&service));
    let mut thread = AgentThread::new();

    agent
        .get_response_in_thread("What is the capital of France?", &mut thread)
        .await
        .unwrap();
    agent
        .get_response_in_thread("How many people live there?", &mut thread)
        .await
        .unwrap();

    assert_eq!(thread.len(), 4);
    assert_eq!(thread.messages()[1].content, "Paris.");
    assert_eq!(thread.messages()[1].name.as_deref(), Some("Assistant"));

    let requests = service.requests();
    let second = &requests[1];
    assert_eq!(second.messages.len(), 4);
    assert_eq!(second.messages[1], ChatMessage::user("What is the capital of France?"));
    assert_eq!(second.messages[3], ChatMessage::user("How many people live there?"));
}

#[tokio::test]
async fn failed_turn_leaves_thread_unchanged() {
    let service = Arc::new(RecordingService::default());
    service.queue_failure(503);
    let agent = agent_with(Arc::clone(&service));
    let mut thread = AgentThread::new();

    let err = agent
        .get_response_in_thread("anyone there?", &mut thread)
        .await
        .unwrap_err();

    assert!(matches!(err, SampleError::Api { status: 503, .. }));
    assert!(thread.is_empty());
}

#[test]
fn threads_get_distinct_ids() {
    assert_ne!(AgentThread::new().id(), AgentThread::new().id());
}

#[tokio::test]
async fn invoke_stream_yields_full_text() {
    let service = Arc::new(RecordingService::default());
    let agent = agent_with(Arc::clone(&service));

    let mut stream = agent.invoke_stream("Why is the sky blue?").await.unwrap();
    let mut text = String::new();
    let mut finished = false;
    while let Some(delta) = stream.next().await {
        let delta = delta.unwrap();
        text.push_str(&delta.text);
        finished |= delta.is_done();
    }

    assert_eq!(text, TEST_RESPONSE);
    assert!(finished);
    assert_eq!(service.requests()[0].messages.len(), 2);
}

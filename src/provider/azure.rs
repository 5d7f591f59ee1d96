//! Azure OpenAI Chat Completions client.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::{TokenCredential, COGNITIVE_SERVICES_SCOPE};
use crate::config::ClientConfig;
use crate::error::SampleError;
use crate::types::*;

use super::http::{auth_headers, parse_sse_data, shared_client, status_to_error, SSE_DONE};
use super::ChatCompletionService;

const SERVICE_ID: &str = "azure-openai";

/// Chat-completion client for one Azure OpenAI deployment.
pub struct AzureChatCompletion {
    credential: Arc<dyn TokenCredential>,
    deployment_name: String,
    url: String,
}

impl std::fmt::Debug for AzureChatCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureChatCompletion")
            .field("deployment_name", &self.deployment_name)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl AzureChatCompletion {
    /// Build a client from its connection parameters.
    ///
    /// `endpoint`: e.g. "https://myresource.openai.azure.com"
    /// `deployment_name`: e.g. "gpt-4o"
    /// `api_version`: e.g. "2024-10-21"
    pub fn new(config: ClientConfig) -> Result<Self, SampleError> {
        let ClientConfig {
            credential,
            endpoint,
            deployment_name,
            api_version,
        } = config;

        let endpoint = endpoint.trim().trim_end_matches('/');
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(SampleError::Configuration(format!(
                "Endpoint must be an http(s) URL, got '{endpoint}'"
            )));
        }
        if deployment_name.trim().is_empty() {
            return Err(SampleError::Configuration("Deployment name is empty".into()));
        }
        if api_version.trim().is_empty() {
            return Err(SampleError::Configuration("API version is empty".into()));
        }

        let url = format!(
            "{endpoint}/openai/deployments/{deployment_name}/chat/completions?api-version={api_version}"
        );
        Ok(Self {
            credential,
            deployment_name,
            url,
        })
    }

    /// Full request URL, including the `api-version` query.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send(&self, request: &ChatRequest, stream: bool) -> Result<reqwest::Response, SampleError> {
        let token = self.credential.get_token(&[COGNITIVE_SERVICES_SCOPE]).await?;
        let headers = auth_headers(self.credential.auth_scheme(), &token.token)?;
        let body = build_request_body(request, stream);

        debug!(
            deployment = self.deployment_name.as_str(),
            messages = request.messages.len(),
            stream,
            "Azure OpenAI chat completion"
        );

        let resp = shared_client()
            .post(&self.url)
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let headers = resp.headers().clone();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status.as_u16(), &headers, &body_text));
        }
        Ok(resp)
    }
}

#[async_trait]
impl ChatCompletionService for AzureChatCompletion {
    fn service_id(&self) -> &str {
        SERVICE_ID
    }

    fn deployment_name(&self) -> &str {
        &self.deployment_name
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, SampleError> {
        let resp = self.send(request, false).await?;
        let data: ChatResponse = resp.json().await?;

        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SampleError::api(200, "No choices in Azure OpenAI response"))?;

        Ok(ChatCompletion {
            text: choice.message.content.unwrap_or_default(),
            usage: data.usage.map(Usage::from).unwrap_or_default(),
            finish_reason: choice.finish_reason.as_deref().and_then(parse_finish_reason),
        })
    }

    async fn complete_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<BoxStream<'static, Result<StreamDelta, SampleError>>, SampleError> {
        let resp = self.send(request, true).await?;
        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            let mut buffer: Vec<u8> = Vec::new();
            let mut finished = false;
            futures::pin_mut!(byte_stream);

            'read: while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(SampleError::Stream(e.to_string()));
                        finished = true;
                        break;
                    }
                };

                // Only complete lines are decoded; a multi-byte character may
                // straddle two chunks.
                buffer.extend_from_slice(&chunk);
                while let Some(line_end) = buffer.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=line_end).collect();
                    match decode_sse_line(&line) {
                        SseLine::Skip => {}
                        SseLine::Done => {
                            finished = true;
                            break 'read;
                        }
                        SseLine::Delta(delta) => yield Ok(delta),
                    }
                }
            }

            // The last event may arrive without a trailing newline.
            if !finished {
                if let SseLine::Delta(delta) = decode_sse_line(&buffer) {
                    yield Ok(delta);
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// One decoded line of an Azure OpenAI event stream.
enum SseLine {
    Skip,
    Done,
    Delta(StreamDelta),
}

fn decode_sse_line(raw: &[u8]) -> SseLine {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line.trim(),
        Err(e) => {
            warn!(error = %e, "skipping stream line that is not UTF-8");
            return SseLine::Skip;
        }
    };
    if line.is_empty() || line.starts_with(':') {
        return SseLine::Skip;
    }
    let Some(data) = parse_sse_data(line) else {
        return SseLine::Skip;
    };
    if data == SSE_DONE {
        return SseLine::Done;
    }
    let chunk = match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            warn!(error = %e, "skipping unparseable stream chunk");
            return SseLine::Skip;
        }
    };
    // Azure sends a prompt-filter prelude with no choices.
    let Some(choice) = chunk.choices.into_iter().next() else {
        return SseLine::Skip;
    };
    SseLine::Delta(StreamDelta {
        text: choice.delta.content.unwrap_or_default(),
        finish_reason: choice.finish_reason.as_deref().and_then(parse_finish_reason),
        usage: chunk.usage.map(Usage::from),
    })
}

fn build_request_body(request: &ChatRequest, stream: bool) -> serde_json::Value {
    let mut body = serde_json::json!({
        "messages": request.messages,
        "stream": stream,
    });

    if let Some(obj) = body.as_object_mut() {
        let settings = &request.settings;
        if let Some(max) = settings.max_tokens {
            obj.insert("max_tokens".into(), max.into());
        }
        if let Some(temp) = settings.temperature {
            obj.insert("temperature".into(), temp.into());
        }
        if let Some(top_p) = settings.top_p {
            obj.insert("top_p".into(), top_p.into());
        }
        if let Some(ref stops) = settings.stop_sequences {
            obj.insert("stop".into(), serde_json::json!(stops));
        }
        if let Some(pp) = settings.presence_penalty {
            obj.insert("presence_penalty".into(), pp.into());
        }
        if let Some(fp) = settings.frequency_penalty {
            obj.insert("frequency_penalty".into(), fp.into());
        }
        if let Some(seed) = settings.seed {
            obj.insert("seed".into(), seed.into());
        }
        if let Some(ref user) = settings.user {
            obj.insert("user".into(), user.clone().into());
        }
    }

    body
}

fn parse_finish_reason(s: &str) -> Option<FinishReason> {
    match s {
        "stop" => Some(FinishReason::Stop),
        "length" => Some(FinishReason::Length),
        "tool_calls" | "function_call" => Some(FinishReason::ToolCalls),
        "content_filter" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}

// Azure OpenAI wire types (internal)

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl From<WireUsage> for Usage {
    fn from(u: WireUsage) -> Self {
        Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: StreamWireDelta,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct StreamWireDelta {
    content: Option<String>,
}

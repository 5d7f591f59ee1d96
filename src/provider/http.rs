//! Shared HTTP client, SSE parsing, and status mapping.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER,
};

use crate::auth::AuthScheme;
use crate::error::{ErrorDetails, SampleError};

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Sentinel payload that ends an OpenAI-style event stream.
pub const SSE_DONE: &str = "[DONE]";

/// Headers for an Azure OpenAI request authorized with `secret`.
///
/// Fails if the secret cannot be sent as a header value.
pub fn auth_headers(scheme: AuthScheme, secret: &str) -> Result<HeaderMap, SampleError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let (name, value) = match scheme {
        AuthScheme::Bearer => (AUTHORIZATION, format!("Bearer {secret}")),
        AuthScheme::ApiKey => (HeaderName::from_static("api-key"), secret.to_string()),
    };
    let mut value = HeaderValue::from_str(&value).map_err(|_| {
        SampleError::Authentication(format!(
            "{} credential is not a valid header value",
            name.as_str()
        ))
    })?;
    value.set_sensitive(true);
    headers.insert(name, value);
    Ok(headers)
}

/// Payload of an SSE "data:" line; None for any other line.
pub fn parse_sse_data(line: &str) -> Option<&str> {
    Some(line.strip_prefix("data:")?.trim_start())
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, headers: &HeaderMap, body: &str) -> SampleError {
    match status {
        401 | 403 => SampleError::Authentication(error_message(body)),
        429 => SampleError::RateLimited {
            retry_after_ms: retry_after_header(headers).or_else(|| retry_after_body(body)),
        },
        _ => match ErrorDetails::from_body(body) {
            Some(details) if details.is_content_filtered() => SampleError::ContentFiltered(
                details.message.unwrap_or_else(|| body.to_string()),
            ),
            Some(details) => {
                let message = details.message.clone().unwrap_or_else(|| body.to_string());
                SampleError::api_with_details(status, message, details)
            }
            None => SampleError::api(status, body),
        },
    }
}

fn error_message(body: &str) -> String {
    ErrorDetails::from_body(body)
        .and_then(|d| d.message)
        .unwrap_or_else(|| body.to_string())
}

fn retry_after_header(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .map(|s| (s * 1000.0) as u64)
}

fn retry_after_body(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}

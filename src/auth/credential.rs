//! The credential seam between configuration and the chat-completion client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::AuthError;
use super::token::AccessToken;

/// Scope for Azure OpenAI / Cognitive Services data-plane tokens.
pub const COGNITIVE_SERVICES_SCOPE: &str = "https://cognitiveservices.azure.com/.default";

/// How a credential's secret is presented to Azure OpenAI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>` (Entra ID tokens).
    Bearer,
    /// `api-key: <key>` (resource keys).
    ApiKey,
}

/// Source of access tokens for a chat-completion client.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Acquire a token valid for `scopes`.
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, AuthError>;

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::Bearer
    }
}

/// A static Azure OpenAI resource key.
pub struct ApiKeyCredential {
    key: String,
}

impl ApiKeyCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

#[async_trait]
impl TokenCredential for ApiKeyCredential {
    async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken, AuthError> {
        if self.key.is_empty() {
            return Err(AuthError::Unavailable("API key is empty".into()));
        }
        Ok(AccessToken::new(self.key.clone(), DateTime::<Utc>::MAX_UTC))
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::ApiKey
    }
}

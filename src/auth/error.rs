use thiserror::Error;

use crate::error::SampleError;

/// Failures while acquiring a credential.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not logged in to the Azure CLI; run `az login`")]
    NotLoggedIn,
    #[error("Credential unavailable: {0}")]
    Unavailable(String),
    #[error("Credential command failed: {0}")]
    CommandFailed(String),
    #[error("Credential command timed out after {0}ms")]
    Timeout(u64),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<AuthError> for SampleError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Timeout(ms) => SampleError::Timeout(ms),
            other => SampleError::Authentication(other.to_string()),
        }
    }
}

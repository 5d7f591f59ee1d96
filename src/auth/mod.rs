//! Credentials used to authorize chat-completion requests.

pub mod azure_cli;
pub mod credential;
pub mod error;
pub mod token;

pub use azure_cli::AzureCliCredential;
pub use credential::{ApiKeyCredential, AuthScheme, TokenCredential, COGNITIVE_SERVICES_SCOPE};
pub use error::AuthError;
pub use token::AccessToken;

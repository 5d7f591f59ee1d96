//! Credential backed by the signed-in Azure CLI account.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::debug;

use super::credential::{TokenCredential, COGNITIVE_SERVICES_SCOPE};
use super::error::AuthError;
use super::token::AccessToken;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const REFRESH_MARGIN_MINUTES: i64 = 5;

/// Acquires Entra ID tokens by running `az account get-access-token`.
///
/// Tokens are cached per scope until five minutes before they expire.
///
/// # Example
/// ```no_run
/// use sksample::auth::{AzureCliCredential, TokenCredential, COGNITIVE_SERVICES_SCOPE};
///
/// # async fn example() -> Result<(), sksample::auth::AuthError> {
/// let credential = AzureCliCredential::new();
/// let token = credential.get_token(&[COGNITIVE_SERVICES_SCOPE]).await?;
/// println!("expires {}", token.expires_on);
/// # Ok(())
/// # }
/// ```
pub struct AzureCliCredential {
    program: PathBuf,
    timeout: Duration,
    cache: Mutex<Option<(String, AccessToken)>>,
}

impl Default for AzureCliCredential {
    fn default() -> Self {
        Self::new()
    }
}

impl AzureCliCredential {
    pub fn new() -> Self {
        let program = if cfg!(windows) { "az.cmd" } else { "az" };
        Self {
            program: PathBuf::from(program),
            timeout: DEFAULT_TIMEOUT,
            cache: Mutex::new(None),
        }
    }

    /// Use a different `az` executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn fetch(&self, scope: &str) -> Result<AccessToken, AuthError> {
        debug!(scope, program = %self.program.display(), "requesting token from Azure CLI");

        let mut command = Command::new(&self.program);
        command
            .args(["account", "get-access-token", "--output", "json", "--scope", scope])
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Err(_) => return Err(AuthError::Timeout(self.timeout.as_millis() as u64)),
            Ok(Err(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthError::Unavailable(format!(
                    "Azure CLI not found at '{}'",
                    self.program.display()
                )))
            }
            Ok(Err(err)) => return Err(err.into()),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.contains("az login") {
                return Err(AuthError::NotLoggedIn);
            }
            return Err(AuthError::CommandFailed(stderr));
        }

        parse_cli_output(&String::from_utf8_lossy(&output.stdout))
    }
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, AuthError> {
        let scope = match scopes {
            [] => COGNITIVE_SERVICES_SCOPE,
            [scope] => *scope,
            _ => {
                return Err(AuthError::Unsupported(
                    "Azure CLI accepts exactly one scope".into(),
                ))
            }
        };

        let mut cache = self.cache.lock().await;
        if let Some((cached_scope, token)) = cache.as_ref() {
            if cached_scope == scope
                && !token.expires_within(chrono::Duration::minutes(REFRESH_MARGIN_MINUTES))
            {
                return Ok(token.clone());
            }
        }

        let token = self.fetch(scope).await?;
        *cache = Some((scope.to_string(), token.clone()));
        Ok(token)
    }
}

#[derive(Deserialize)]
struct CliTokenOutput {
    #[serde(rename = "accessToken")]
    access_token: String,
    /// Unix seconds; present in azure-cli 2.54 and later.
    #[serde(rename = "expires_on", default)]
    expires_on: Option<i64>,
    /// Local wall-clock time, e.g. `2024-01-01 12:00:00.000000`.
    #[serde(rename = "expiresOn", default)]
    expires_on_local: Option<String>,
}

pub(crate) fn parse_cli_output(raw: &str) -> Result<AccessToken, AuthError> {
    let payload: CliTokenOutput = serde_json::from_str(raw)?;

    let expires_on = if let Some(secs) = payload.expires_on {
        DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| AuthError::InvalidResponse(format!("bad expires_on: {secs}")))?
    } else if let Some(ref local) = payload.expires_on_local {
        parse_local_expiry(local)?
    } else {
        return Err(AuthError::InvalidResponse(
            "token output has no expiry".into(),
        ));
    };

    Ok(AccessToken::new(payload.access_token, expires_on))
}

fn parse_local_expiry(value: &str) -> Result<DateTime<Utc>, AuthError> {
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .map_err(|e| AuthError::InvalidResponse(format!("bad expiresOn '{value}': {e}")))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| AuthError::InvalidResponse(format!("nonexistent local time '{value}'")))
}

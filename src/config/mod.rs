//! Configuration (layered: explicit > env > config file > defaults).

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::auth::TokenCredential;
use crate::error::SampleError;

pub const ENV_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const ENV_DEPLOYMENT_NAME: &str = "AZURE_OPENAI_CHAT_DEPLOYMENT_NAME";
pub const ENV_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";
pub const ENV_API_KEY: &str = "AZURE_OPENAI_API_KEY";

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2024-10-21";

/// Connection settings for an Azure OpenAI chat deployment.
///
/// Every field is optional until [`resolve`](Self::resolve) checks the
/// required ones. Layers are combined with [`merge`](Self::merge), where the
/// argument wins for every field it sets.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AzureOpenAiSettings {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub deployment_name: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl fmt::Debug for AzureOpenAiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureOpenAiSettings")
            .field("endpoint", &self.endpoint)
            .field("deployment_name", &self.deployment_name)
            .field("api_version", &self.api_version)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AzureOpenAiSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the `AZURE_OPENAI_*` variables, loading `.env` first if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            endpoint: var(ENV_ENDPOINT),
            deployment_name: var(ENV_DEPLOYMENT_NAME),
            api_version: var(ENV_API_VERSION),
            api_key: var(ENV_API_KEY),
        }
    }

    /// Load a TOML settings file. A missing file yields empty settings.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SampleError> {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(err) => return Err(SampleError::Io(err)),
        };
        let settings: Self = toml::from_str(&raw).map_err(|e| {
            SampleError::Configuration(format!("Invalid config file {}: {e}", path.display()))
        })?;
        Ok(settings.without_blanks())
    }

    /// Treat blank values as unset, the same as empty environment variables.
    fn without_blanks(self) -> Self {
        let keep = |v: Option<String>| v.filter(|v| !v.trim().is_empty());
        Self {
            endpoint: keep(self.endpoint),
            deployment_name: keep(self.deployment_name),
            api_version: keep(self.api_version),
            api_key: keep(self.api_key),
        }
    }

    /// `<platform config dir>/sksample/config.toml`, if a home directory exists.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "sksample")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Defaults, then the config file, then the environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self, SampleError> {
        let file = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) => Self::from_file(path)?,
                None => Self::new(),
            },
        };
        Ok(Self::defaults().merge(file).merge(Self::from_env()))
    }

    fn defaults() -> Self {
        Self {
            api_version: Some(DEFAULT_API_VERSION.to_string()),
            ..Self::default()
        }
    }

    /// Overlay `other` on top of `self`.
    pub fn merge(self, other: Self) -> Self {
        Self {
            endpoint: other.endpoint.or(self.endpoint),
            deployment_name: other.deployment_name.or(self.deployment_name),
            api_version: other.api_version.or(self.api_version),
            api_key: other.api_key.or(self.api_key),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_deployment_name(mut self, deployment_name: impl Into<String>) -> Self {
        self.deployment_name = Some(deployment_name.into());
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Check required fields and produce the values a client needs.
    pub fn resolve(&self) -> Result<ResolvedSettings, SampleError> {
        let endpoint = self.endpoint.clone().ok_or_else(|| missing(ENV_ENDPOINT))?;
        let deployment_name = self
            .deployment_name
            .clone()
            .ok_or_else(|| missing(ENV_DEPLOYMENT_NAME))?;
        let api_version = self
            .api_version
            .clone()
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        Ok(ResolvedSettings {
            endpoint,
            deployment_name,
            api_version,
        })
    }
}

fn missing(var: &str) -> SampleError {
    SampleError::Configuration(format!("Missing {var}"))
}

/// Required connection values after layering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub endpoint: String,
    pub deployment_name: String,
    pub api_version: String,
}

/// Everything needed to construct a chat-completion client.
#[derive(Clone)]
pub struct ClientConfig {
    pub credential: Arc<dyn TokenCredential>,
    pub endpoint: String,
    pub deployment_name: String,
    pub api_version: String,
}

impl ClientConfig {
    pub fn new(credential: Arc<dyn TokenCredential>, settings: ResolvedSettings) -> Self {
        Self {
            credential,
            endpoint: settings.endpoint,
            deployment_name: settings.deployment_name,
            api_version: settings.api_version,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("credential", &"..")
            .field("endpoint", &self.endpoint)
            .field("deployment_name", &self.deployment_name)
            .field("api_version", &self.api_version)
            .finish()
    }
}

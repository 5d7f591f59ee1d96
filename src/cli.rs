//! Command-line arguments for the `sksample` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::config::AzureOpenAiSettings;
use crate::error::SampleError;

/// Ask an Azure OpenAI agent a few questions about the world.
///
/// Every flag is optional; by default connection settings come from the
/// `AZURE_OPENAI_*` environment variables (or a `.env` file) and the
/// config file.
#[derive(Parser, Debug)]
#[command(name = "sksample", version)]
pub struct Cli {
    /// Azure OpenAI endpoint, e.g. https://myresource.openai.azure.com
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Chat deployment name
    #[arg(long)]
    pub deployment: Option<String>,

    /// REST API version
    #[arg(long)]
    pub api_version: Option<String>,

    /// Settings file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print answers as they stream in
    #[arg(long)]
    pub stream: bool,
}

impl Cli {
    /// Flag values as the top settings layer.
    pub fn overrides(&self) -> AzureOpenAiSettings {
        AzureOpenAiSettings {
            endpoint: self.endpoint.clone(),
            deployment_name: self.deployment.clone(),
            api_version: self.api_version.clone(),
            api_key: None,
        }
    }

    /// Load every configuration layer and apply the flags last.
    pub fn settings(&self) -> Result<AzureOpenAiSettings, SampleError> {
        Ok(AzureOpenAiSettings::load(self.config.as_deref())?.merge(self.overrides()))
    }
}

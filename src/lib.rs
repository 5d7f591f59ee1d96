//! sksample — a chat-completion agent backed by Azure OpenAI.
//!
//! Builds a credential, an Azure OpenAI chat-completion client, and a named
//! agent, then asks the agent a fixed list of questions.
//!
//! # Quick Start
//!
//! ```no_run
//! use sksample::prelude::*;
//!
//! # async fn example() -> sksample::error::Result<()> {
//! let settings = AzureOpenAiSettings::load(None)?;
//! let factory = AzureSampleFactory::new(&settings);
//! sksample::sample::run(&factory, &settings.resolve()?, &mut std::io::stdout()).await?;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod auth;
pub mod config;
pub mod error;
pub mod prelude;
pub mod provider;
pub mod sample;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;

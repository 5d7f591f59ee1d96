//! sksample binary entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sksample::cli::Cli;
use sksample::sample::{self, AzureSampleFactory};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> sksample::error::Result<()> {
    let settings = cli.settings()?;
    let resolved = settings.resolve()?;
    let factory = AzureSampleFactory::new(&settings);

    let mut stdout = std::io::stdout().lock();
    if cli.stream {
        sample::run_streaming(&factory, &resolved, &mut stdout).await
    } else {
        sample::run(&factory, &resolved, &mut stdout).await
    }
}

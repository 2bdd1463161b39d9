#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use sinu::Config;
use sinu::cli::Cli;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Install default crypto provider for Rustls TLS.
    // Without it reqwest cannot determine the process-level CryptoProvider.
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    let cli = Cli::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = Config::load_or_init()?;
    config.apply_env_overrides();
    config.validate()?;
    sinu::app::dispatch::dispatch(cli, config).await
}

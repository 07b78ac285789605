//! Jadegen - Main Entry Point

use clap::Parser;
use jadegen::{Cli, run};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match run(cli, std::env::vars()).await {
        Ok(output) => tracing::info!(files = output.written.len(), "done"),
        Err(err) => {
            tracing::error!("{err:#}");
            std::process::exit(1);
        }
    }
}

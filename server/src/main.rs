use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::{AppState, Application};
use shared::config::load_config;

/// Stateless bearer-token authentication gateway.
#[derive(Parser, Debug)]
#[command(name = "tokenguard-server", version, about)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config))?;
    let addr = config.server.addr();

    let state = AppState::from_config(config)?;
    let app = Application::build(state, &addr).await?;

    tokio::select! {
        result = app.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
    }

    info!("Server closed!");
    Ok(())
}

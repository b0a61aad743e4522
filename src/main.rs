use clap::Parser;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod actors;
mod cli;
mod config;
mod metrics;
mod models;
mod terminal;

use actors::CoffeeHouse;
use cli::Cli;
use config::Settings;
use terminal::CoffeeHouseApp;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=coffee_house=trace cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,coffee_house=debug"))
        )
        .init();

    let cli = Cli::parse();

    // === 1. Resolve settings ===
    let settings = Settings::load(cli.config.as_deref(), &cli.overrides)?;
    tracing::info!(
        caffeine_limit = settings.caffeine_limit,
        topology = %settings.topology,
        baristas = settings.barista.pool_size,
        accuracy = settings.barista.accuracy,
        "⚙️ Settings loaded"
    );

    // === 2. Initialize Prometheus metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 3. Open the coffee house (hires its own staff) ===
    let status_timeout = settings.status_timeout;
    let house = CoffeeHouse::open(&cli.name, settings, metrics.clone());

    // === 4. Drive it from the terminal until quit or end of input ===
    let app = CoffeeHouseApp::new(cli.name, house, status_timeout, metrics);
    app.run(BufReader::new(tokio::io::stdin())).await?;

    tracing::info!("👋 Goodbye");
    Ok(())
}

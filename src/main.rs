mod config;
mod extract;
mod metrics;
mod pipeline;
mod platform;
mod providers;
mod server;
mod worker;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::metrics::{MetricsSink, PrometheusSink};
use crate::pipeline::Pipeline;
use crate::providers::ProviderRegistry;
use crate::server::OpsState;
use crate::worker::WorkerClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,clipbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Worker: {}", config.worker.base_url);
    info!("  Providers: {:?}", config.providers);
    info!("  Ops server: {}", config.observability.bind_addr);

    // The Prometheus recorder must be installed before anything records.
    let handle = metrics::init_recorder()?;
    let sink: Arc<dyn MetricsSink> = Arc::new(PrometheusSink);

    let worker = WorkerClient::new(&config.worker)?;
    let registry = ProviderRegistry::new(config.providers.clone());
    let pipeline = Arc::new(Pipeline::new(registry, worker.clone(), sink.clone()));

    // Ops endpoints run alongside the bot.
    let ops_state = OpsState::new(handle, worker);
    let bind_addr = config.observability.bind_addr.clone();
    let ops_sink = sink.clone();
    tokio::spawn(async move {
        if let Err(e) = server::run(&bind_addr, ops_state, ops_sink).await {
            error!("Ops server exited: {:#}", e);
        }
    });

    info!("Bot is starting...");
    platform::telegram::run(pipeline, &config.telegram.bot_token, sink).await?;

    Ok(())
}

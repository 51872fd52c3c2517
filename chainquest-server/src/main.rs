//! ChainQuest Server
//!
//! Progression backend for an NFT game driven by Kwala workflow webhooks.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use chainquest_core::MemoryStore;
use chainquest_core::entities::character::InsertCharacter;
use chainquest_core::events::notification_channel;
use chainquest_core::processors::{NotificationLogger, ProgressionEngine};
use clap::{Parser, ValueEnum};
use config::ConfigLoader;
use kanau::processor::Processor;
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// ChainQuest - webhook-driven game progression server
#[derive(Parser, Debug)]
#[command(name = "chainquest-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "CHAINQUEST_CONFIG", default_value = "./chainquest-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3001)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Log output format
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);

    tracing::info!("Starting chainquest-server v{}", env!("CARGO_PKG_VERSION"));

    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = loaded_config.server.listen;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let (shared_config, characters) = loaded_config.into_shared();

    let store = MemoryStore::new();
    let seeded = characters.len();
    for character in characters {
        store.process(InsertCharacter { character }).await?;
    }
    tracing::info!(count = seeded, "Seed characters loaded");

    let (notification_tx, notification_rx) = notification_channel();
    let engine = ProgressionEngine::new(store, notification_tx);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let logger = tokio::spawn(NotificationLogger::new(notification_rx, shutdown_rx).run());

    let state = AppState::new(engine, shared_config).await;
    let reload_notify = spawn_config_reload_handler(state.clone(), config_loader);

    let router = build_router(state);

    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    reload_notify.notify_one();
    let _ = shutdown_tx.send(true);
    if let Err(e) = logger.await {
        tracing::warn!("Notification logger ended abnormally: {}", e);
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

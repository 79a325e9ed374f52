//! Herald Node - live catalog notifications over WebSocket.

use anyhow::Context;
use clap::Parser;
use herald_node::observability::init_logging;
use herald_node::{create_router, AppState, NodeConfig};
use std::path::PathBuf;

/// Herald Node - broadcast catalog changes to connected clients
#[derive(Parser, Debug)]
#[command(name = "herald-node")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a configuration file (YAML, TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long)]
    log_format: Option<String>,
}

impl Args {
    /// Apply command-line overrides on top of loaded configuration.
    fn apply(self, config: &mut NodeConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config =
        NodeConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    args.apply(&mut config);

    init_logging(&config.log_level, config.json_logs());

    let addr = config
        .listen_addr()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Herald node");
    tracing::info!(
        addr = %addr,
        outbound_capacity = config.outbound_capacity,
        write_timeout_ms = config.write_timeout_ms,
        max_connections = config.max_connections,
        "Node configuration"
    );

    let (state, _notifier_task) = AppState::from_config(&config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Herald node stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

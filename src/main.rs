//! Request pipeline service.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                     PIPELINE                     │
//!   Client Request        │  ┌─────────┐   ┌─────────┐   ┌──────┐            │
//!   ──────────────────────┼─▶│ context │──▶│  cors   │──▶│      │            │
//!                         │  │extractor│   │preflight│   │      │            │
//!                         │  └─────────┘   └─────────┘   │ app  │            │
//!                         │                              │route │            │
//!   Client Response       │  ┌─────────┐   ┌─────────┐   │      │            │
//!   ◀─────────────────────┼──│sanitizer│◀──│ headers │◀──│      │            │
//!                         │  └─────────┘   └─────────┘   └──────┘            │
//!                         └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use request_pipeline::config::{load_config, ServiceConfig};
use request_pipeline::http::{service_routes, HttpServer};
use request_pipeline::lifecycle::Shutdown;
use request_pipeline::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "request-pipeline")]
#[command(about = "HTTP service behind the request/response pipeline", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("request-pipeline v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        cors_enabled = config.cors.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, service_routes());
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

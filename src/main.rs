//! resource-engine
//!
//! Serves an in-memory document store through the decision engine.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (axum, request id, timeout, body limit)
//!                         │
//!                         ▼
//!                     store::DocumentDispatcher → DocumentResource
//!                         │
//!                         ▼
//!                     engine (decision graph)
//!                         │  asks the resource, runs negotiation
//!                         ▼
//!     Client Response ◀── http::Response (committed)
//!
//!     Cross-cutting: config (TOML), observability (tracing, metrics),
//!                    lifecycle (graceful shutdown)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use resource_engine::config::{load_config, AppConfig};
use resource_engine::engine::Engine;
use resource_engine::http::HttpServer;
use resource_engine::lifecycle::Shutdown;
use resource_engine::observability::{logging, metrics};
use resource_engine::store::{DocumentDispatcher, DocumentStore};

#[derive(Parser)]
#[command(name = "resource-engine")]
#[command(version, about = "Serve a document store through the HTTP decision engine", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override server.bind_address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    logging::init(&config.observability.log_level);
    tracing::info!("resource-engine v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.server.bind_address,
        max_body_bytes = config.server.max_body_bytes,
        request_timeout_secs = config.server.request_timeout_secs,
        server_name = %config.engine.server_name,
        enable_ranges = config.engine.enable_ranges,
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

    let engine = Engine::new(&config.engine);
    let dispatcher = DocumentDispatcher::new(Arc::new(DocumentStore::new()));
    let server = HttpServer::new(config.server.clone(), engine, dispatcher);

    let listener = server.bind().await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    server.run(listener, Shutdown::new()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

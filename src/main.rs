//! Protection gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                 PROTECTION GATEWAY                   │
//!                      │                                                      │
//!  Client Request      │  ┌──────────┐   ┌───────────┐   ┌───────────────┐   │
//!  ────────────────────┼─▶│  http    │──▶│  routes   │──▶│    engine     │───┼──▶ Decision
//!                      │  │  server  │   │ (per cap.)│   │    client     │   │    engine
//!                      │  └──────────┘   └─────┬─────┘   └───────┬───────┘   │    (hosted)
//!                      │                       │                 │           │
//!  Client Response     │  ┌──────────┐         ▼                 ▼           │
//!  ◀───────────────────┼──│ response │◀── allow / deny ◀──── Decision ◀──────┼───
//!                      │  └──────────┘                                       │
//!                      │                                                      │
//!                      │  ┌────────────────────────────────────────────────┐ │
//!                      │  │ config │ observability │ lifecycle             │ │
//!                      │  └────────────────────────────────────────────────┘ │
//!                      └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use protection_gateway::config::{self, GatewayConfig};
use protection_gateway::lifecycle::{self, signals, Shutdown};
use protection_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "protection-gateway")]
#[command(about = "HTTP routes guarded by a hosted request-protection engine", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::loader::finalize(GatewayConfig::default())?,
    };

    logging::init_tracing(&config.observability);
    tracing::info!("protection-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        engine = %config.engine.base_url,
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

    let (server, listener) = lifecycle::start(config).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::wait_for_shutdown(&shutdown).await;
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}

//! Startup orchestration.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The engine client is built before the listener binds
//! - Listeners start last (traffic only when ready)

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::engine::{EngineError, HttpDecisionEngine, SharedEngine};
use crate::http::GatewayServer;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("engine client: {0}")]
    Engine(#[from] EngineError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Build the engine client for a validated configuration.
pub fn build_engine(config: &GatewayConfig) -> Result<SharedEngine, StartupError> {
    let key = config
        .engine
        .key
        .as_deref()
        .ok_or_else(|| EngineError::Config("missing site key".to_string()))?;
    let engine = HttpDecisionEngine::new(&config.engine, key)?;
    Ok(Arc::new(engine))
}

/// Build the server and bind its listener.
pub async fn start(config: GatewayConfig) -> Result<(GatewayServer, TcpListener), StartupError> {
    let engine = build_engine(&config)?;

    let address = config.listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    Ok((GatewayServer::new(config, engine), listener))
}

//! Protection gateway library.
//!
//! HTTP routes that delegate every protective decision to a hosted
//! decision engine, plus an operator console with a local countdown
//! simulator of the engine's token bucket.

pub mod config;
pub mod console;
pub mod engine;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use engine::{Decision, DecisionEngine, Policy};
pub use http::GatewayServer;
pub use lifecycle::Shutdown;

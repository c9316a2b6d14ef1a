//! Operator console for the protected routes.
//!
//! Submits test inputs, renders the raw decision payloads, and mirrors the
//! rate limiter locally with a countdown simulator.

pub mod client;
pub mod clock;
pub mod scenarios;
pub mod simulator;

pub use client::{ConsoleError, Exchange, GatewayClient};
pub use scenarios::{Scenario, TestCase};
pub use simulator::{BucketParams, BucketSnapshot, CountdownSimulator};

use crate::config::schema::TokenBucketPolicyConfig;

impl From<&TokenBucketPolicyConfig> for BucketParams {
    fn from(config: &TokenBucketPolicyConfig) -> Self {
        Self {
            capacity: config.capacity,
            refill_amount: config.refill_rate,
            interval: std::time::Duration::from_secs(config.interval_secs),
            cost: config.requested,
        }
    }
}

/// Feed a rate-limit response into the simulator. A success without a
/// token count is replayed as a simulated request; failures change nothing.
pub fn apply_exchange<C: clock::Clock>(sim: &mut CountdownSimulator<C>, exchange: &Exchange) {
    match exchange.remaining_tokens() {
        Some(remaining) => sim.observe(remaining),
        None if exchange.is_success() => {
            sim.consume();
        }
        None => {}
    }
}

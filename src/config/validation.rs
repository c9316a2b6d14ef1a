//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, capacities > 0)
//! - Check the engine can be reached with what is configured
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, TokenBucketPolicyConfig};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    match config.engine.base_url.parse::<url::Url>() {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "engine.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("engine.base_url", e.to_string())),
    }

    match &config.engine.key {
        Some(key) if !key.trim().is_empty() => {}
        _ => errors.push(ValidationError::new(
            "engine.key",
            "missing site key (set ARCJET_KEY)",
        )),
    }

    if config.engine.timeout_ms == 0 {
        errors.push(ValidationError::new("engine.timeout_ms", "must be > 0"));
    }

    // The engine call must time out before the request deadline so a slow
    // engine is reported as an engine failure (500), not a 408.
    let request_ms = config.timeouts.request_secs.saturating_mul(1000);
    if config.timeouts.request_secs > 0 && config.engine.timeout_ms >= request_ms {
        errors.push(ValidationError::new(
            "engine.timeout_ms",
            format!(
                "must be below timeouts.request_secs ({} ms)",
                request_ms
            ),
        ));
    }

    validate_bucket("policies.rate_limit", &config.policies.rate_limit, &mut errors);
    if let Some(bucket) = &config.policies.protect.token_bucket {
        validate_bucket("policies.protect.token_bucket", bucket, &mut errors);
    }

    let signup = &config.policies.signup;
    if signup.window_secs == 0 {
        errors.push(ValidationError::new("policies.signup.window_secs", "must be > 0"));
    }
    if signup.max == 0 {
        errors.push(ValidationError::new("policies.signup.max", "must be > 0"));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_bucket(prefix: &str, bucket: &TokenBucketPolicyConfig, errors: &mut Vec<ValidationError>) {
    if bucket.capacity == 0 {
        errors.push(ValidationError::new(&format!("{}.capacity", prefix), "must be > 0"));
    }
    if bucket.refill_rate == 0 {
        errors.push(ValidationError::new(&format!("{}.refill_rate", prefix), "must be > 0"));
    }
    if bucket.interval_secs == 0 {
        errors.push(ValidationError::new(&format!("{}.interval_secs", prefix), "must be > 0"));
    }
    if bucket.requested == 0 || bucket.requested > bucket.capacity {
        errors.push(ValidationError::new(
            &format!("{}.requested", prefix),
            format!("must be between 1 and capacity ({})", bucket.capacity),
        ));
    }
}

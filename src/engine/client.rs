//! Decision engine client.
//!
//! # Responsibilities
//! - Send a request snapshot plus the route's policy to the engine
//! - Decode the returned decision
//! - Classify failures (transport, timeout, auth, status, decode)
//!
//! No retries: a failed call is reported once and the route answers 500.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Serialize;

use crate::config::schema::EngineConfig;
use crate::engine::policy::{Policy, Rule};
use crate::engine::request::RequestDetails;
use crate::engine::types::{Decision, EngineError, EngineResult};

/// Rate limits are tracked per source IP.
pub const CHARACTERISTICS: [&str; 1] = ["ip.src"];

/// Anything that can turn a request snapshot and a policy into a decision.
pub trait DecisionEngine: Send + Sync {
    fn decide<'a>(
        &'a self,
        details: &'a RequestDetails,
        policy: &'a Policy,
    ) -> BoxFuture<'a, EngineResult<Decision>>;
}

/// Shared handle to the configured engine.
pub type SharedEngine = Arc<dyn DecisionEngine>;

#[derive(Serialize)]
struct DecideRequest<'a> {
    characteristics: &'a [&'a str],
    rules: &'a [Rule],
    details: &'a RequestDetails,
}

/// HTTP client for the hosted decision API.
#[derive(Clone)]
pub struct HttpDecisionEngine {
    client: reqwest::Client,
    decide_url: url::Url,
    timeout_ms: u64,
}

impl HttpDecisionEngine {
    /// Build a client from configuration. `key` is the resolved site key.
    pub fn new(config: &EngineConfig, key: &str) -> EngineResult<Self> {
        let base: url::Url = config.base_url.parse().map_err(|e| {
            EngineError::Config(format!("invalid base URL '{}': {}", config.base_url, e))
        })?;
        let decide_url = base
            .join("/v1/decide")
            .map_err(|e| EngineError::Config(e.to_string()))?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", key))
            .map_err(|_| EngineError::Config("site key contains invalid characters".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("protection-gateway/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(|e| EngineError::Config(e.to_string()))?;

        tracing::info!(
            decide_url = %decide_url,
            timeout_ms = config.timeout_ms,
            "Decision engine client initialized"
        );

        Ok(Self {
            client,
            decide_url,
            timeout_ms: config.timeout_ms,
        })
    }

    async fn call(&self, details: &RequestDetails, policy: &Policy) -> EngineResult<Decision> {
        let start = Instant::now();
        let body = DecideRequest {
            characteristics: &CHARACTERISTICS,
            rules: &policy.rules,
            details,
        };

        let response = self
            .client
            .post(self.decide_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(EngineError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Status {
                status: status.as_u16(),
                body: truncate(&body, 256),
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        let decision: Decision =
            serde_json::from_slice(&bytes).map_err(|e| EngineError::Decode(e.to_string()))?;

        tracing::debug!(
            decision_id = %decision.id,
            conclusion = decision.conclusion.as_str(),
            reason = decision.reason.kind(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Decision received"
        );

        Ok(decision)
    }

    fn classify(&self, err: reqwest::Error) -> EngineError {
        if err.is_timeout() {
            EngineError::Timeout(self.timeout_ms)
        } else if err.is_decode() {
            EngineError::Decode(err.to_string())
        } else {
            EngineError::Transport(err.to_string())
        }
    }
}

impl DecisionEngine for HttpDecisionEngine {
    fn decide<'a>(
        &'a self,
        details: &'a RequestDetails,
        policy: &'a Policy,
    ) -> BoxFuture<'a, EngineResult<Decision>> {
        Box::pin(self.call(details, policy))
    }
}

impl std::fmt::Debug for HttpDecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDecisionEngine")
            .field("decide_url", &self.decide_url.as_str())
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

//! HTTP client for the gateway's protected routes.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("unknown {kind} '{label}'")]
    UnknownCase { kind: &'static str, label: String },
}

/// One request/response pair as shown to the operator.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub status: u16,
    #[serde(rename = "durationMs")]
    pub duration_ms: u128,
    pub body: Value,
}

impl Exchange {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `remainingTokens` from a rate-limit response.
    pub fn remaining_tokens(&self) -> Option<u32> {
        self.body
            .get("remainingTokens")
            .and_then(Value::as_u64)
            .map(|n| n.min(u32::MAX as u64) as u32)
    }
}

pub struct GatewayClient {
    client: Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Result<Self, ConsoleError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, route: &str) -> String {
        format!("{}/api/protect{}", self.base_url, route)
    }

    pub async fn protect(&self, data: Option<Value>) -> Result<Exchange, ConsoleError> {
        let request = match data {
            Some(data) => self.client.post(self.url("")).json(&data),
            None => self.client.get(self.url("")),
        };
        send(request).await
    }

    pub async fn bot_detection(&self, user_agent: &str) -> Result<Exchange, ConsoleError> {
        let request = self
            .client
            .get(self.url("/bot-detection"))
            .header(USER_AGENT, HeaderValue::from_str(user_agent)?);
        send(request).await
    }

    pub async fn rate_limit(&self) -> Result<Exchange, ConsoleError> {
        send(self.client.get(self.url("/rate-limit"))).await
    }

    pub async fn sensitive_info(&self, text: &str) -> Result<Exchange, ConsoleError> {
        let request = self
            .client
            .post(self.url("/sensitive-info"))
            .json(&json!({ "input": text }));
        send(request).await
    }

    /// `suspicious` sets the header the engine's test mode treats as an attack.
    pub async fn shield(&self, input: Option<&str>, suspicious: bool) -> Result<Exchange, ConsoleError> {
        let mut request = self.client.post(self.url("/shield"));
        if let Some(input) = input {
            request = request.json(&json!({ "input": input }));
        }
        if suspicious {
            request = request.header("x-arcjet-suspicious", "true");
        }
        send(request).await
    }

    pub async fn signup(&self, email: &str) -> Result<Exchange, ConsoleError> {
        let request = self
            .client
            .post(self.url("/signup-protection"))
            .json(&json!({ "email": email }));
        send(request).await
    }
}

async fn send(request: RequestBuilder) -> Result<Exchange, ConsoleError> {
    let start = Instant::now();
    let response = request.send().await?;
    let status = response.status().as_u16();
    let text = response.text().await?;
    let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

    Ok(Exchange {
        status,
        duration_ms: start.elapsed().as_millis(),
        body,
    })
}

//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use futures_util::future::BoxFuture;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

use protection_gateway::engine::policy::{EmailType, SensitiveInfoType};
use protection_gateway::engine::types::{IdentifiedEntity, RuleResult};
use protection_gateway::engine::{
    Conclusion, Decision, DecisionEngine, EngineError, EngineResult, Policy, Reason,
    RequestDetails, Rule,
};
use protection_gateway::http::{build_router, AppState};
use protection_gateway::GatewayConfig;

const DISPOSABLE_DOMAINS: [&str; 3] = ["10minutemail.com", "mailinator.com", "guerrillamail.com"];
const NO_MX_DOMAINS: [&str; 2] = ["nonexistent-domain.com", "spam-domain.xyz"];
const SEARCH_ENGINES: [(&str, &str); 2] = [("googlebot", "GOOGLE_CRAWLER"), ("bingbot", "BING_CRAWLER")];
const AUTOMATED: [(&str, &str); 5] = [
    ("python", "PYTHON_URLLIB"),
    ("curl", "CURL"),
    ("petalbot", "PETALBOT"),
    ("bot", "UNKNOWN_BOT"),
    ("trust-me", "UNKNOWN_BOT"),
];

/// In-process stand-in for the hosted engine.
///
/// Evaluates every rule of a policy with deliberately simple heuristics so
/// route behavior can be tested end to end without the network.
#[derive(Default)]
pub struct FakeEngine {
    buckets: Mutex<HashMap<String, (u32, Instant)>>,
    windows: Mutex<HashMap<String, Vec<Instant>>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<RequestDetails>>,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Request snapshots received so far.
    pub fn seen(&self) -> Vec<RequestDetails> {
        self.seen.lock().unwrap().clone()
    }

    fn evaluate(&self, details: &RequestDetails, policy: &Policy) -> Decision {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(details.clone());

        let results: Vec<RuleResult> = policy
            .rules
            .iter()
            .enumerate()
            .map(|(i, rule)| {
                let (conclusion, reason) = self.evaluate_rule(details, rule);
                RuleResult {
                    rule_id: format!("rule_{}", i),
                    state: "RUN".to_string(),
                    conclusion,
                    reason,
                    ttl: 0,
                }
            })
            .collect();

        let denied = results.iter().find(|r| r.conclusion == Conclusion::Deny);
        let (conclusion, reason) = match (denied, results.last()) {
            (Some(d), _) => (Conclusion::Deny, d.reason.clone()),
            (None, Some(last)) => (Conclusion::Allow, last.reason.clone()),
            (None, None) => (Conclusion::Allow, Reason::Unknown),
        };

        Decision {
            id: format!("fake_{}", n),
            conclusion,
            reason,
            ttl: 0,
            results,
        }
    }

    fn evaluate_rule(&self, details: &RequestDetails, rule: &Rule) -> (Conclusion, Reason) {
        match rule {
            Rule::TokenBucket {
                refill_rate,
                interval,
                capacity,
                ..
            } => {
                let requested = details
                    .extra
                    .get("requested")
                    .and_then(|r| r.parse().ok())
                    .unwrap_or(1u32);
                let mut buckets = self.buckets.lock().unwrap();
                let now = Instant::now();
                let (tokens, last) = buckets.entry(details.ip.clone()).or_insert((*capacity, now));
                let period = Duration::from_secs(*interval);
                let elapsed = now.duration_since(*last);
                let refills = (elapsed.as_secs() / (*interval).max(1)) as u32;
                if refills > 0 {
                    *tokens = (*tokens + refills * refill_rate).min(*capacity);
                    *last += period * refills;
                }
                let allowed = *tokens >= requested;
                if allowed {
                    *tokens -= requested;
                }
                let reason = Reason::RateLimit {
                    max: *capacity,
                    remaining: *tokens,
                    window: *interval,
                    reset_in_seconds: *interval,
                    reset_time: Some("2026-10-18T12:00:10Z".to_string()),
                };
                (verdict(allowed), reason)
            }
            Rule::SlidingWindow { interval, max, .. } => {
                let mut windows = self.windows.lock().unwrap();
                let now = Instant::now();
                let window = Duration::from_secs(*interval);
                let hits = windows.entry(details.ip.clone()).or_default();
                hits.retain(|t| now.duration_since(*t) < window);
                let allowed = (hits.len() as u32) < *max;
                if allowed {
                    hits.push(now);
                }
                let reason = Reason::RateLimit {
                    max: *max,
                    remaining: max.saturating_sub(hits.len() as u32),
                    window: *interval,
                    reset_in_seconds: *interval,
                    reset_time: None,
                };
                (verdict(allowed), reason)
            }
            Rule::DetectBot { allow, .. } => {
                let ua = details.user_agent().unwrap_or_default().to_lowercase();
                let (name, category) = classify_agent(&ua);
                let allowed = match &name {
                    None => true,
                    Some(name) => allow
                        .iter()
                        .any(|a| a.0 == *name || Some(a.0.as_str()) == category),
                };
                let reason = Reason::Bot {
                    allowed: if allowed { name.iter().map(|n| n.as_str().into()).collect() } else { Vec::new() },
                    denied: if allowed { Vec::new() } else { name.iter().map(|n| n.as_str().into()).collect() },
                    verified: false,
                    spoofed: false,
                };
                (verdict(allowed), reason)
            }
            Rule::SensitiveInfo { deny, .. } => {
                let text = details.body.clone().unwrap_or_default();
                let found = detect_entities(&text);
                let (denied, allowed): (Vec<_>, Vec<_>) = found
                    .into_iter()
                    .partition(|e| deny.iter().any(|d| d.as_str() == e.identified_type));
                let ok = denied.is_empty();
                (verdict(ok), Reason::SensitiveInfo { allowed, denied })
            }
            Rule::Shield { .. } => {
                let flagged = details
                    .headers
                    .get("x-arcjet-suspicious")
                    .map(|v| v == "true")
                    .unwrap_or(false);
                let body = details.body.clone().unwrap_or_default().to_lowercase();
                let injected = ["' or 1=1", "<script", "../", "union select"]
                    .iter()
                    .any(|sig| body.contains(sig) || details.query.to_lowercase().contains(sig));
                let triggered = flagged || injected;
                (verdict(!triggered), Reason::Shield { shield_triggered: triggered })
            }
            Rule::Email { block, .. } => {
                let email = details.extra.get("email").cloned().unwrap_or_default();
                let types = classify_email(&email);
                let allowed = !types.iter().any(|t| block.contains(t));
                (verdict(allowed), Reason::Email { email_types: types })
            }
        }
    }
}

fn verdict(allowed: bool) -> Conclusion {
    if allowed {
        Conclusion::Allow
    } else {
        Conclusion::Deny
    }
}

fn classify_agent(ua: &str) -> (Option<String>, Option<&'static str>) {
    if ua.is_empty() {
        return (Some("UNKNOWN_BOT".to_string()), None);
    }
    for (needle, name) in SEARCH_ENGINES {
        if ua.contains(needle) {
            return (Some(name.to_string()), Some("CATEGORY:SEARCH_ENGINE"));
        }
    }
    for (needle, name) in AUTOMATED {
        if ua.contains(needle) {
            return (Some(name.to_string()), None);
        }
    }
    (None, None)
}

fn classify_email(email: &str) -> Vec<EmailType> {
    let Some((local, domain)) = email.split_once('@') else {
        return vec![EmailType::Invalid];
    };
    if local.is_empty() || !domain.contains('.') {
        return vec![EmailType::Invalid];
    }
    let domain = domain.to_lowercase();
    let mut types = Vec::new();
    if DISPOSABLE_DOMAINS.contains(&domain.as_str()) {
        types.push(EmailType::Disposable);
    }
    if NO_MX_DOMAINS.contains(&domain.as_str()) {
        types.push(EmailType::NoMxRecords);
    }
    if domain == "gmail.com" {
        types.push(EmailType::Free);
    }
    types
}

fn detect_entities(text: &str) -> Vec<IdentifiedEntity> {
    let mut found = Vec::new();
    let mut offset = 0;
    for word in text.split_whitespace() {
        let start = offset + text[offset..].find(word).unwrap_or(0);
        let end = start + word.len();
        offset = end;

        let token = word.trim_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '(' | ')'));
        let digits: String = token.chars().filter(char::is_ascii_digit).collect();
        let only_digits_and_dashes = !token.is_empty()
            && token.chars().all(|c| c.is_ascii_digit() || c == '-');

        let kind = if token.contains('@') && token.contains('.') {
            Some(SensitiveInfoType::Email)
        } else if token.parse::<IpAddr>().is_ok() {
            Some(SensitiveInfoType::IpAddress)
        } else if only_digits_and_dashes && (13..=19).contains(&digits.len()) {
            Some(SensitiveInfoType::CreditCardNumber)
        } else if token.starts_with('+') && digits.len() >= 10 {
            Some(SensitiveInfoType::PhoneNumber)
        } else {
            None
        };

        if let Some(kind) = kind {
            found.push(IdentifiedEntity {
                identified_type: kind.as_str().to_string(),
                start,
                end,
            });
        }
    }
    found
}

impl DecisionEngine for FakeEngine {
    fn decide<'a>(
        &'a self,
        details: &'a RequestDetails,
        policy: &'a Policy,
    ) -> BoxFuture<'a, EngineResult<Decision>> {
        let decision = self.evaluate(details, policy);
        Box::pin(async move { Ok(decision) })
    }
}

/// Engine that is always unreachable.
pub struct FailingEngine;

impl DecisionEngine for FailingEngine {
    fn decide<'a>(
        &'a self,
        _details: &'a RequestDetails,
        _policy: &'a Policy,
    ) -> BoxFuture<'a, EngineResult<Decision>> {
        Box::pin(async { Err(EngineError::Transport("connection refused".to_string())) })
    }
}

/// Valid configuration pointing at nothing in particular.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.engine.key = Some("ajkey_test".to_string());
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config
}

pub fn app(engine: Arc<dyn DecisionEngine>, config: &GatewayConfig) -> Router {
    build_router(config, AppState::new(engine, config))
}

/// Drive one request through the router and decode the JSON body.
pub async fn call(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// A raw HTTP request as seen by a mock upstream.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

/// Start a programmable mock upstream on an ephemeral port.
///
/// Reads each request fully, hands it to `f`, and writes back the status and
/// JSON body it returns.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(CapturedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(captured) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(captured).await;
                        let status_text = match status {
                            200 => "200 OK",
                            401 => "401 Unauthorized",
                            403 => "403 Forbidden",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    Some(CapturedRequest { head, body })
}

/// A decision JSON as the hosted engine would send it.
pub fn decision_json(conclusion: &str, reason: Value) -> String {
    serde_json::json!({
        "id": "lreq_test",
        "conclusion": conclusion,
        "reason": reason,
        "ttl": 0,
        "results": [],
    })
    .to_string()
}

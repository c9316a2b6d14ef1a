//! Snapshot of an inbound request as sent to the decision engine.

use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

/// Headers never forwarded to the engine.
const REDACTED_HEADERS: [&str; 3] = ["authorization", "cookie", "proxy-authorization"];

/// Request attributes the engine evaluates rules against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetails {
    pub ip: String,
    pub method: String,
    pub protocol: String,
    pub host: String,
    pub path: String,
    pub query: String,
    pub headers: BTreeMap<String, String>,
    /// Text inspected by body-aware rules (sensitive info, shield).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Per-call parameters such as `requested` or `email`.
    pub extra: BTreeMap<String, String>,
}

impl RequestDetails {
    /// Capture the details of an inbound request.
    ///
    /// The client IP comes from the socket peer; with `trust_forwarded_for`
    /// the first `X-Forwarded-For` hop wins.
    pub fn from_parts(parts: &Parts, trust_forwarded_for: bool) -> Self {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let ip = client_ip(&parts.headers, peer, trust_forwarded_for);

        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| parts.uri.authority().map(|a| a.to_string()))
            .unwrap_or_default();

        let headers = parts
            .headers
            .iter()
            .filter(|(name, _)| !REDACTED_HEADERS.contains(&name.as_str()))
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Self {
            ip,
            method: parts.method.to_string(),
            protocol: format!("{:?}", parts.version),
            host,
            path: parts.uri.path().to_string(),
            query: parts.uri.query().unwrap_or_default().to_string(),
            headers,
            body: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Tokens this call asks the token bucket for.
    pub fn with_requested(mut self, tokens: u32) -> Self {
        self.extra.insert("requested".to_string(), tokens.to_string());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.extra.insert("email".to_string(), email.into());
        self
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.headers.get("user-agent").map(String::as_str)
    }
}

fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .and_then(|v| v.parse::<IpAddr>().ok());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    peer.map(|ip| ip.to_string())
        .unwrap_or_else(|| "127.0.0.1".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    fn parts(request: Request<Body>) -> Parts {
        request.into_parts().0
    }

    #[test]
    fn test_capture_request() {
        let mut req = Request::builder()
            .method("POST")
            .uri("http://demo.local/api/protect/shield?debug=1")
            .header("User-Agent", "curl/8.4.0")
            .header("Cookie", "session=abc")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("203.0.113.7:51000".parse::<SocketAddr>().unwrap()));

        let details = RequestDetails::from_parts(&parts(req), false).with_body("hello");

        assert_eq!(details.ip, "203.0.113.7");
        assert_eq!(details.method, "POST");
        assert_eq!(details.host, "demo.local");
        assert_eq!(details.path, "/api/protect/shield");
        assert_eq!(details.query, "debug=1");
        assert_eq!(details.user_agent(), Some("curl/8.4.0"));
        assert!(!details.headers.contains_key("cookie"));
        assert_eq!(details.body.as_deref(), Some("hello"));
    }

    #[test]
    fn test_forwarded_for_only_when_trusted() {
        let build = || {
            Request::builder()
                .uri("/")
                .header("X-Forwarded-For", "198.51.100.4, 10.0.0.1")
                .body(Body::empty())
                .unwrap()
        };

        let trusted = RequestDetails::from_parts(&parts(build()), true);
        assert_eq!(trusted.ip, "198.51.100.4");

        let untrusted = RequestDetails::from_parts(&parts(build()), false);
        assert_eq!(untrusted.ip, "127.0.0.1");
    }

    #[test]
    fn test_extra_fields() {
        let details = RequestDetails::default()
            .with_requested(5)
            .with_email("user@gmail.com");
        assert_eq!(details.extra.get("requested").map(String::as_str), Some("5"));
        assert_eq!(details.extra.get("email").map(String::as_str), Some("user@gmail.com"));
    }
}

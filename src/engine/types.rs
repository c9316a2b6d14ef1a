//! Decision types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::policy::{BotCategory, EmailType};

/// Overall verdict of a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Conclusion {
    Allow,
    Deny,
    Challenge,
    Error,
}

impl Conclusion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Conclusion::Allow => "ALLOW",
            Conclusion::Deny => "DENY",
            Conclusion::Challenge => "CHALLENGE",
            Conclusion::Error => "ERROR",
        }
    }
}

/// A span of sensitive information found in the inspected text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifiedEntity {
    pub identified_type: String,
    pub start: usize,
    pub end: usize,
}

/// Why the engine reached its conclusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    #[serde(rename_all = "camelCase")]
    RateLimit {
        max: u32,
        remaining: u32,
        /// Window length in seconds.
        #[serde(default)]
        window: u64,
        #[serde(default)]
        reset_in_seconds: u64,
        /// RFC 3339 timestamp at which tokens are refilled.
        #[serde(default)]
        reset_time: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Bot {
        #[serde(default)]
        allowed: Vec<BotCategory>,
        #[serde(default)]
        denied: Vec<BotCategory>,
        #[serde(default)]
        verified: bool,
        #[serde(default)]
        spoofed: bool,
    },
    #[serde(rename_all = "camelCase")]
    Shield {
        shield_triggered: bool,
    },
    SensitiveInfo {
        #[serde(default)]
        allowed: Vec<IdentifiedEntity>,
        #[serde(default)]
        denied: Vec<IdentifiedEntity>,
    },
    #[serde(rename_all = "camelCase")]
    Email {
        #[serde(default)]
        email_types: Vec<EmailType>,
    },
    EdgeRule,
    Error {
        message: String,
    },
    #[serde(other)]
    Unknown,
}

impl Reason {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Reason::RateLimit { .. })
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Reason::RateLimit { .. } => "rate_limit",
            Reason::Bot { .. } => "bot",
            Reason::Shield { .. } => "shield",
            Reason::SensitiveInfo { .. } => "sensitive_info",
            Reason::Email { .. } => "email",
            Reason::EdgeRule => "edge_rule",
            Reason::Error { .. } => "error",
            Reason::Unknown => "unknown",
        }
    }
}

/// Outcome of one rule within a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResult {
    #[serde(default)]
    pub rule_id: String,
    /// `RUN`, `DRY_RUN`, `CACHED` or `NOT_RUN`.
    #[serde(default)]
    pub state: String,
    pub conclusion: Conclusion,
    pub reason: Reason,
    #[serde(default)]
    pub ttl: u32,
}

/// Verdict returned by the decision engine for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub id: String,
    pub conclusion: Conclusion,
    pub reason: Reason,
    #[serde(default)]
    pub ttl: u32,
    #[serde(default)]
    pub results: Vec<RuleResult>,
}

impl Decision {
    pub fn is_denied(&self) -> bool {
        self.conclusion == Conclusion::Deny
    }

    /// Engine-side errors fail open, so they count as allowed.
    pub fn is_allowed(&self) -> bool {
        !self.is_denied()
    }

    pub fn is_error(&self) -> bool {
        self.conclusion == Conclusion::Error
    }

    /// Reason of the first denying rule, else the top-level reason.
    pub fn denial_reason(&self) -> &Reason {
        self.results
            .iter()
            .find(|r| r.conclusion == Conclusion::Deny)
            .map(|r| &r.reason)
            .unwrap_or(&self.reason)
    }

    /// Rate-limit metadata from whichever rule produced it.
    pub fn rate_limit(&self) -> Option<&Reason> {
        if self.reason.is_rate_limit() {
            return Some(&self.reason);
        }
        self.results
            .iter()
            .map(|r| &r.reason)
            .find(|r| r.is_rate_limit())
    }
}

/// Errors that can occur while talking to the decision engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Connection or transport failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Call did not complete within the client timeout.
    #[error("decision call timed out after {0} ms")]
    Timeout(u64),

    /// Engine rejected the site key.
    #[error("engine rejected credentials (status {0})")]
    Unauthorized(u16),

    /// Engine answered with a non-success status.
    #[error("engine returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not a decision.
    #[error("failed to decode decision: {0}")]
    Decode(String),

    /// Client could not be built from configuration.
    #[error("engine client misconfigured: {0}")]
    Config(String),
}

impl EngineError {
    /// Short label used in metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Transport(_) => "transport",
            EngineError::Timeout(_) => "timeout",
            EngineError::Unauthorized(_) => "unauthorized",
            EngineError::Status { .. } => "status",
            EngineError::Decode(_) => "decode",
            EngineError::Config(_) => "config",
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

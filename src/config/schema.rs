//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::engine::policy::{
    BotCategory, EmailType, Mode, SensitiveInfoType,
};

/// Root configuration for the protection gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Decision engine client settings.
    pub engine: EngineConfig,

    /// Per-route protection policies.
    pub policies: PoliciesConfig,

    /// Request hardening.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Decision engine client configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the decision API.
    pub base_url: String,

    /// Site key. Falls back to the `ARCJET_KEY` environment variable.
    pub key: Option<String>,

    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,

    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "https://decide.arcjet.com".to_string(),
            key: None,
            timeout_ms: 1_000,
            connect_timeout_ms: 500,
        }
    }
}

// Never print the key.
impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("base_url", &self.base_url)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}

/// Protection policies, one section per route.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PoliciesConfig {
    pub protect: ProtectPolicyConfig,
    pub bot_detection: BotPolicyConfig,
    pub rate_limit: TokenBucketPolicyConfig,
    pub sensitive_info: SensitiveInfoPolicyConfig,
    pub shield: ShieldPolicyConfig,
    pub signup: SignupPolicyConfig,
}

/// Base policy applied by the generic protect route.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProtectPolicyConfig {
    /// Optional token bucket layered on the base policy.
    pub token_bucket: Option<TokenBucketPolicyConfig>,

    /// Apply the shield rule as part of the base policy.
    pub shield: bool,

    /// Apply bot detection as part of the base policy.
    pub detect_bot: Option<BotPolicyConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BotPolicyConfig {
    pub mode: Mode,
    /// Bot categories or named bots that are let through.
    pub allow: Vec<BotCategory>,
}

impl Default for BotPolicyConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Live,
            allow: vec![BotCategory::from("CATEGORY:SEARCH_ENGINE")],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenBucketPolicyConfig {
    pub mode: Mode,
    /// Tokens added per interval.
    pub refill_rate: u32,
    /// Refill interval in seconds.
    pub interval_secs: u64,
    /// Maximum tokens the bucket holds.
    pub capacity: u32,
    /// Tokens consumed by each request.
    pub requested: u32,
}

impl Default for TokenBucketPolicyConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Live,
            refill_rate: 5,
            interval_secs: 10,
            capacity: 10,
            requested: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SensitiveInfoPolicyConfig {
    pub mode: Mode,
    pub deny: Vec<SensitiveInfoType>,
}

impl Default for SensitiveInfoPolicyConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Live,
            deny: vec![
                SensitiveInfoType::Email,
                SensitiveInfoType::CreditCardNumber,
                SensitiveInfoType::IpAddress,
                SensitiveInfoType::PhoneNumber,
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShieldPolicyConfig {
    pub mode: Mode,
}

impl Default for ShieldPolicyConfig {
    fn default() -> Self {
        Self { mode: Mode::Live }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SignupPolicyConfig {
    pub email_mode: Mode,
    /// Email classes that block a signup.
    pub block: Vec<EmailType>,
    pub bot_mode: Mode,
    /// Bots allowed to sign up (none by default).
    pub allow_bots: Vec<BotCategory>,
    pub rate_limit_mode: Mode,
    /// Sliding window length in seconds.
    pub window_secs: u64,
    /// Maximum signups per window.
    pub max: u32,
}

impl Default for SignupPolicyConfig {
    fn default() -> Self {
        Self {
            email_mode: Mode::Live,
            block: vec![EmailType::Disposable, EmailType::NoMxRecords, EmailType::Invalid],
            bot_mode: Mode::Live,
            allow_bots: Vec::new(),
            rate_limit_mode: Mode::Live,
            window_secs: 600,
            max: 5,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
    /// Use the first `X-Forwarded-For` hop as the client IP.
    pub trust_forwarded_for: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024,
            trust_forwarded_for: false,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

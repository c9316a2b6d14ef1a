//! Declarative protection policies.
//!
//! A [`Policy`] is an ordered list of [`Rule`]s sent to the decision engine
//! with every call. Policies are built once from configuration at startup
//! and shared read-only between requests.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::schema::{
    BotPolicyConfig, PoliciesConfig, ProtectPolicyConfig, SensitiveInfoPolicyConfig,
    ShieldPolicyConfig, SignupPolicyConfig, TokenBucketPolicyConfig,
};

/// Whether a rule's verdict is enforced or only reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    #[default]
    Live,
    DryRun,
}

/// Named bot or bot category, e.g. `CATEGORY:SEARCH_ENGINE` or `CURL`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BotCategory(pub String);

impl From<&str> for BotCategory {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for BotCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Email classes the engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailType {
    Disposable,
    Free,
    NoMxRecords,
    NoGravatar,
    Invalid,
}

/// Categories of sensitive information the engine detects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensitiveInfoType {
    Email,
    CreditCardNumber,
    IpAddress,
    PhoneNumber,
    #[serde(untagged)]
    Custom(String),
}

impl SensitiveInfoType {
    pub fn as_str(&self) -> &str {
        match self {
            SensitiveInfoType::Email => "EMAIL",
            SensitiveInfoType::CreditCardNumber => "CREDIT_CARD_NUMBER",
            SensitiveInfoType::IpAddress => "IP_ADDRESS",
            SensitiveInfoType::PhoneNumber => "PHONE_NUMBER",
            SensitiveInfoType::Custom(name) => name,
        }
    }
}

/// A single protection rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rule {
    #[serde(rename_all = "camelCase")]
    DetectBot {
        mode: Mode,
        allow: Vec<BotCategory>,
    },
    #[serde(rename_all = "camelCase")]
    TokenBucket {
        mode: Mode,
        refill_rate: u32,
        /// Seconds.
        interval: u64,
        capacity: u32,
    },
    #[serde(rename_all = "camelCase")]
    SlidingWindow {
        mode: Mode,
        /// Seconds.
        interval: u64,
        max: u32,
    },
    #[serde(rename_all = "camelCase")]
    SensitiveInfo {
        mode: Mode,
        deny: Vec<SensitiveInfoType>,
    },
    Shield {
        mode: Mode,
    },
    #[serde(rename_all = "camelCase")]
    Email {
        mode: Mode,
        block: Vec<EmailType>,
    },
}

impl Rule {
    pub fn detect_bot(config: &BotPolicyConfig) -> Self {
        Rule::DetectBot {
            mode: config.mode,
            allow: config.allow.clone(),
        }
    }

    pub fn token_bucket(config: &TokenBucketPolicyConfig) -> Self {
        Rule::TokenBucket {
            mode: config.mode,
            refill_rate: config.refill_rate,
            interval: config.interval_secs,
            capacity: config.capacity,
        }
    }

    pub fn sensitive_info(config: &SensitiveInfoPolicyConfig) -> Self {
        Rule::SensitiveInfo {
            mode: config.mode,
            deny: config.deny.clone(),
        }
    }

    pub fn shield(config: &ShieldPolicyConfig) -> Self {
        Rule::Shield { mode: config.mode }
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Rule::DetectBot { .. } => "detect_bot",
            Rule::TokenBucket { .. } => "token_bucket",
            Rule::SlidingWindow { .. } => "sliding_window",
            Rule::SensitiveInfo { .. } => "sensitive_info",
            Rule::Shield { .. } => "shield",
            Rule::Email { .. } => "email",
        }
    }
}

/// Ordered rule set for one route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub rules: Vec<Rule>,
}

impl Policy {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Base policy of the generic protect route. Empty unless configured.
    pub fn protect(config: &ProtectPolicyConfig) -> Self {
        let mut rules = Vec::new();
        if config.shield {
            rules.push(Rule::Shield { mode: Mode::Live });
        }
        if let Some(bot) = &config.detect_bot {
            rules.push(Rule::detect_bot(bot));
        }
        if let Some(bucket) = &config.token_bucket {
            rules.push(Rule::token_bucket(bucket));
        }
        Self { rules }
    }

    /// Composite signup policy: email validation, bot detection and a
    /// sliding-window limit.
    pub fn protect_signup(config: &SignupPolicyConfig) -> Self {
        Self {
            rules: vec![
                Rule::Email {
                    mode: config.email_mode,
                    block: config.block.clone(),
                },
                Rule::DetectBot {
                    mode: config.bot_mode,
                    allow: config.allow_bots.clone(),
                },
                Rule::SlidingWindow {
                    mode: config.rate_limit_mode,
                    interval: config.window_secs,
                    max: config.max,
                },
            ],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// The fixed policy of every protected route.
#[derive(Debug, Clone)]
pub struct RoutePolicies {
    pub protect: Policy,
    pub bot_detection: Policy,
    pub rate_limit: Policy,
    /// Tokens each rate-limit request asks for.
    pub rate_limit_cost: u32,
    pub sensitive_info: Policy,
    pub shield: Policy,
    pub signup: Policy,
}

impl RoutePolicies {
    pub fn from_config(config: &PoliciesConfig) -> Self {
        Self {
            protect: Policy::protect(&config.protect),
            bot_detection: Policy::new(vec![Rule::detect_bot(&config.bot_detection)]),
            rate_limit: Policy::new(vec![Rule::token_bucket(&config.rate_limit)]),
            rate_limit_cost: config.rate_limit.requested,
            sensitive_info: Policy::new(vec![Rule::sensitive_info(&config.sensitive_info)]),
            shield: Policy::new(vec![Rule::shield(&config.shield)]),
            signup: Policy::protect_signup(&config.signup),
        }
    }
}

/// Refill parameters of a token-bucket rule, if the policy has one.
pub fn token_bucket_params(policy: &Policy) -> Option<(u32, u32, Duration)> {
    policy.rules.iter().find_map(|rule| match rule {
        Rule::TokenBucket {
            capacity,
            refill_rate,
            interval,
            ..
        } => Some((*capacity, *refill_rate, Duration::from_secs(*interval))),
        _ => None,
    })
}

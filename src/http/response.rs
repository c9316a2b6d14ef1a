//! Response bodies and error mapping.
//!
//! # Responsibilities
//! - Map a denial to 429 (rate limit) or 403 (everything else)
//! - Shape the JSON bodies returned by each route
//! - Convert failures into responses without leaking details
//!
//! # Design Decisions
//! - Policy denials are not errors; they are ordinary responses
//! - Engine failures always surface as a bare 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::engine::{Decision, EngineError, Reason};

/// Failures at the route boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request body.
    #[error("invalid request body: {0}")]
    BadRequest(String),

    /// The decision engine could not be consulted.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = match self {
            ApiError::BadRequest(_) => "Invalid request body",
            ApiError::Engine(_) => "Internal server error",
        };
        (self.status(), Json(ErrorBody { error })).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

/// Body of a policy denial.
#[derive(Debug, Serialize)]
pub struct DeniedBody<'a> {
    pub error: &'static str,
    pub reason: &'a Reason,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DecisionBody<'a> {
    pub message: &'static str,
    pub decision: &'a Decision,
}

#[derive(Debug, Serialize)]
pub struct ReasonBody<'a> {
    pub message: &'static str,
    pub reason: &'a Reason,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitBody {
    pub message: &'static str,
    pub remaining_tokens: Option<u32>,
    pub reset_time: Option<String>,
}

/// 429 for rate limiting, 403 for any other denial.
pub fn denial_status(reason: &Reason) -> StatusCode {
    if reason.is_rate_limit() {
        StatusCode::TOO_MANY_REQUESTS
    } else {
        StatusCode::FORBIDDEN
    }
}

/// A denial with the given status and the decision's first failing reason.
pub fn denied(status: StatusCode, error: &'static str, decision: &Decision) -> Response {
    (
        status,
        Json(DeniedBody {
            error,
            reason: decision.denial_reason(),
        }),
    )
        .into_response()
}

pub fn message(text: &'static str) -> Response {
    Json(MessageBody { message: text }).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denial_status() {
        let rate = Reason::RateLimit {
            max: 10,
            remaining: 0,
            window: 10,
            reset_in_seconds: 10,
            reset_time: None,
        };
        assert_eq!(denial_status(&rate), StatusCode::TOO_MANY_REQUESTS);

        let bot = Reason::Bot {
            allowed: Vec::new(),
            denied: vec!["CURL".into()],
            verified: false,
            spoofed: false,
        };
        assert_eq!(denial_status(&bot), StatusCode::FORBIDDEN);
        assert_eq!(denial_status(&Reason::Unknown), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(
            ApiError::BadRequest("eof".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Engine(EngineError::Timeout(1000)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_rate_limit_body_shape() {
        let body = RateLimitBody {
            message: "Rate limit exceeded",
            remaining_tokens: Some(0),
            reset_time: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "message": "Rate limit exceeded",
                "remainingTokens": 0,
                "resetTime": null,
            })
        );
    }
}

//! Token-bucket rate limiting.
//!
//! Each call asks for a fixed number of tokens. With the default policy
//! (capacity 10, 5 tokens per 10 s, 5 per call) a fresh client gets two
//! requests through before the third is limited.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::engine::Reason;
use crate::http::request::ClientRequest;
use crate::http::response::{ApiError, RateLimitBody};
use crate::http::server::AppState;

const ROUTE: &str = "rate_limit";

pub async fn rate_limit(
    State(state): State<AppState>,
    client: ClientRequest,
) -> Result<Response, ApiError> {
    let details = client.details.with_requested(state.policies.rate_limit_cost);
    let decision = state
        .decide(ROUTE, &client.request_id, &details, &state.policies.rate_limit)
        .await?;

    let (remaining, reset_time) = match decision.rate_limit() {
        Some(Reason::RateLimit {
            remaining,
            reset_time,
            ..
        }) => (Some(*remaining), reset_time.clone()),
        _ => (None, None),
    };

    if decision.is_denied() {
        let body = RateLimitBody {
            message: "Rate limit exceeded",
            remaining_tokens: Some(remaining.unwrap_or(0)),
            reset_time,
        };
        return Ok((StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response());
    }

    Ok(Json(RateLimitBody {
        message: "Request successful",
        remaining_tokens: remaining,
        reset_time,
    })
    .into_response())
}

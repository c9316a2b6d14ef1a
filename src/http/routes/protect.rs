//! Generic protect route: the base policy, no route-specific rules.

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};

use crate::http::request::ClientRequest;
use crate::http::response::{denial_status, denied, ApiError, DecisionBody};
use crate::http::routes::optional_json;
use crate::http::server::AppState;

const ROUTE: &str = "protect";

pub async fn protect_get(
    State(state): State<AppState>,
    client: ClientRequest,
) -> Result<Response, ApiError> {
    let decision = state
        .decide(ROUTE, &client.request_id, &client.details, &state.policies.protect)
        .await?;

    if decision.is_denied() {
        let status = denial_status(decision.denial_reason());
        return Ok(denied(status, "Request Denied", &decision));
    }

    Ok(Json(DecisionBody {
        message: "Hello world",
        decision: &decision,
    })
    .into_response())
}

/// Accepts an optional JSON payload; its text is offered to body-aware rules.
pub async fn protect_post(
    State(state): State<AppState>,
    client: ClientRequest,
    body: Bytes,
) -> Result<Response, ApiError> {
    let payload: Option<serde_json::Value> = optional_json(&body)?;
    let details = match payload {
        Some(value) => client.details.with_body(value.to_string()),
        None => client.details,
    };

    let decision = state
        .decide(ROUTE, &client.request_id, &details, &state.policies.protect)
        .await?;

    if decision.is_denied() {
        let status = denial_status(decision.denial_reason());
        return Ok(denied(status, "Request Denied", &decision));
    }

    Ok(Json(DecisionBody {
        message: "Data processed successfully",
        decision: &decision,
    })
    .into_response())
}

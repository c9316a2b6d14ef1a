//! Shield: generic attack-signature filtering.
//!
//! The body is optional. Attack signals usually live in headers and the
//! query string, so a bare POST is still evaluated.

use axum::{body::Bytes, extract::State, http::StatusCode, response::Response};

use crate::http::request::ClientRequest;
use crate::http::response::{denied, message, ApiError};
use crate::http::routes::optional_json;
use crate::http::routes::sensitive_info::TextInput;
use crate::http::server::AppState;

const ROUTE: &str = "shield";

pub async fn shield(
    State(state): State<AppState>,
    client: ClientRequest,
    body: Bytes,
) -> Result<Response, ApiError> {
    let details = match optional_json::<TextInput>(&body)? {
        Some(payload) => client.details.with_body(payload.input),
        None => client.details,
    };

    let decision = state
        .decide(ROUTE, &client.request_id, &details, &state.policies.shield)
        .await?;

    if decision.is_denied() {
        return Ok(denied(StatusCode::FORBIDDEN, "Security Threat Detected", &decision));
    }

    Ok(message("Request passed security checks"))
}

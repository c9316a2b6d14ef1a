//! Sensitive-information detection over submitted free text.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;

use crate::http::request::ClientRequest;
use crate::http::response::{denied, message, ApiError};
use crate::http::routes::required_json;
use crate::http::server::AppState;

const ROUTE: &str = "sensitive_info";

#[derive(Debug, Deserialize)]
pub struct TextInput {
    pub input: String,
}

pub async fn sensitive_info(
    State(state): State<AppState>,
    client: ClientRequest,
    body: Bytes,
) -> Result<Response, ApiError> {
    let payload: TextInput = required_json(&body)?;
    let details = client.details.with_body(payload.input);

    let decision = state
        .decide(ROUTE, &client.request_id, &details, &state.policies.sensitive_info)
        .await?;

    if decision.is_denied() {
        return Ok(denied(
            StatusCode::FORBIDDEN,
            "Sensitive Information Detected",
            &decision,
        ));
    }

    Ok(message("No sensitive information detected"))
}

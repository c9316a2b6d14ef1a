//! Signup protection: email validation, bot detection and a sliding-window
//! limit evaluated together. A denial reports the first rule that failed.

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

const ROUTE: &str = "signup";

#[derive(Debug, Deserialize)]
pub struct SignupInput {
    pub email: String,
}

pub async fn signup(
    State(state): State<AppState>,
    client: ClientRequest,
    body: Bytes,
) -> Result<Response, ApiError> {
    let payload: SignupInput = required_json(&body)?;
    let details = client.details.with_email(payload.email.trim());

    let decision = state
        .decide(ROUTE, &client.request_id, &details, &state.policies.signup)
        .await?;

    if decision.is_denied() {
        return Ok(denied(
            StatusCode::FORBIDDEN,
            "Signup Protection Triggered",
            &decision,
        ));
    }

    Ok(message("Signup allowed"))
}

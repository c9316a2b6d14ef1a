//! Bot detection: search engines pass, other automated clients are denied.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::http::request::ClientRequest;
use crate::http::response::{denied, ApiError, ReasonBody};
use crate::http::server::AppState;

const ROUTE: &str = "bot_detection";

pub async fn bot_detection(
    State(state): State<AppState>,
    client: ClientRequest,
) -> Result<Response, ApiError> {
    let decision = state
        .decide(ROUTE, &client.request_id, &client.details, &state.policies.bot_detection)
        .await?;

    if decision.is_denied() {
        return Ok(denied(StatusCode::FORBIDDEN, "Bot Traffic Detected", &decision));
    }

    Ok(Json(ReasonBody {
        message: "Human traffic allowed",
        reason: &decision.reason,
    })
    .into_response())
}

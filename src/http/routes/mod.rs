//! Protected routes, one module per capability.
//!
//! Every handler follows the same shape: capture the request, ask the
//! engine with the route's fixed policy, map allow/deny to a response.

pub mod bot_detection;
pub mod health;
pub mod protect;
pub mod rate_limit;
pub mod sensitive_info;
pub mod shield;
pub mod signup;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::http::response::ApiError;

/// Parse an optional JSON body: empty means `None`, anything else must be
/// valid JSON of the expected shape.
pub(crate) fn optional_json<T: DeserializeOwned>(body: &Bytes) -> Result<Option<T>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Parse a required JSON body. The content type is not checked; an empty
/// body is as malformed as invalid JSON.
pub(crate) fn required_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    optional_json(body)?.ok_or_else(|| ApiError::BadRequest("empty body".to_string()))
}

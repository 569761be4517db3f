//! Response helpers.
//!
//! Every rejection the gateway emits is a structured JSON body with a short
//! message; internal detail stays in the logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Build a JSON error response: `{"error": "<message>"}`.
pub fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

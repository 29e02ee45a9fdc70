//! JSON response helpers.
//!
//! Every error the service reports has the shape `{"message": "..."}` with no
//! internal detail; success bodies are serialized DTOs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

pub const ENDPOINT_NOT_FOUND: &str = "Endpoint not found";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// `{"message": message}` with the given status.
pub fn json_message(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "message": message.into() }))).into_response()
}

pub fn json_body<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, Json(body)).into_response()
}

pub fn not_found() -> Response {
    json_message(StatusCode::NOT_FOUND, ENDPOINT_NOT_FOUND)
}

pub fn internal_error() -> Response {
    json_message(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
}

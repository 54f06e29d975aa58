//! API error taxonomy. One enum, one response shape per variant.

use crate::store::StoreError;
use crate::validate::FieldError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed credential. The two messages ("No token
    /// provided" vs "Invalid token") are externally observable.
    Unauthenticated(&'static str),
    /// Collected field errors, surfaced as a structured list.
    Validation(Vec<FieldError>),
    /// Single-message client error (mock login's missing credentials).
    BadRequest(&'static str),
    /// Wrong id and wrong owner are deliberately indistinguishable.
    NotFound,
    /// Persistence failure. Logged in full, surfaced as a generic message.
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthenticated(message) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "message": message }))).into_response()
            }
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": "Task not found" }))).into_response()
            }
            ApiError::Store(e) => {
                tracing::error!(error = %e, "store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

//! API error types with IntoResponse
//!
//! - NotFound: 404 `{"message": "Not found"}`
//! - Persistence: 500 `{"error": <message from the data layer>}`
//! - Validation / Body: 400 `{"error": <reason>}`

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbError;
use crate::models::ValidationError;

/// Fixed body message for missing records
pub const NOT_FOUND_MESSAGE: &str = "Not found";

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Payload or query failed validation (400)
    Validation(ValidationError),

    /// Request body or query string could not be decoded (400)
    Body { message: String },

    /// No record with this id (404)
    NotFound { resource: &'static str, id: i64 },

    /// Persistence layer failure (500, logged)
    Persistence(DbError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(e) => (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() })),
            Self::Body { message } => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            Self::NotFound { resource, id } => {
                tracing::debug!(resource, id, "record not found");
                (StatusCode::NOT_FOUND, json!({ "message": NOT_FOUND_MESSAGE }))
            }
            Self::Persistence(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": e.to_string() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        Self::Persistence(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body {
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Body {
            message: rejection.body_text(),
        }
    }
}

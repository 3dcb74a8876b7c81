//! Custom Axum extractors

use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::request::Parts;
use serde::Deserialize;

use super::error::ApiError;
use crate::models::ValidationError;

/// Extract and validate a record id from path
pub struct ValidId(pub i64);

impl<S> FromRequestParts<S> for ValidId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(invalid_id()))?;

        parse_id(&raw).map(Self).map_err(ApiError::from)
    }
}

fn invalid_id() -> ValidationError {
    ValidationError::InvalidFormat {
        field: "id",
        reason: "must be a positive integer",
    }
}

fn parse_id(raw: &str) -> Result<i64, ValidationError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(invalid_id)
}

/// JSON body whose rejections render as `ApiError`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Query string as ordered `(key, value)` pairs.
///
/// Pair lists never fail on repeated or unknown keys, so list endpoints can
/// stay lenient; remaining rejections render as `ApiError`.
#[derive(Deserialize, FromRequestParts)]
#[serde(transparent)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryPairs(pub Vec<(String, String)>);

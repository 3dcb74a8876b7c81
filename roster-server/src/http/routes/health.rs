//! Liveness endpoint

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::models::{Course, Resource, Student, Teacher};

/// GET /health body
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Mounted resource collections
    pub resources: [&'static str; 3],
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        resources: [Student::COLLECTION, Teacher::COLLECTION, Course::COLLECTION],
    })
}

/// Health routes, usable under any router state
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}

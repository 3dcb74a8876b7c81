//! roster-server: REST resources for students, teachers and courses
//!
//! Each resource exposes create, list (paginated, sorted, optionally
//! joined with Course), get, partial update and delete over one generic
//! handler set. Storage is PostgreSQL via sqlx, or an in-memory backend.

pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod state;

pub use error::{Result, ServerError};
pub use http::{build_router, run_server, ServerConfig};
pub use state::AppState;

//! Error types for roster-server

use thiserror::Error;

use crate::db::DbError;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Startup and serve failures (request-level failures are `ApiError`)
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl From<sqlx::Error> for ServerError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(DbError::Sqlx(e))
    }
}

//! Repository contract shared by every backend

use std::collections::HashMap;

use async_trait::async_trait;

use crate::models::{Course, ListQuery, Resource, WithCourses};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),

    /// Referential or uniqueness constraint rejected the write
    #[error("{0}")]
    Constraint(String),
}

/// Data-access operations for one entity type.
///
/// Lookups return `Ok(None)` for missing ids; only real failures are errors.
#[async_trait]
pub trait Repository<E: Resource>: Send + Sync {
    /// Insert a record, returning it with its generated id.
    async fn create(&self, input: E::Create) -> Result<E, DbError>;

    /// One page of records in the requested order, joined with Courses when
    /// `query.include_courses` is set and the entity has a Course relation.
    async fn find_all(&self, query: &ListQuery) -> Result<Vec<WithCourses<E>>, DbError>;

    /// A single record, optionally joined with its Courses.
    async fn find_by_pk(&self, id: i64, include_courses: bool)
        -> Result<Option<WithCourses<E>>, DbError>;

    /// Apply a partial patch. `None` when the id does not exist.
    async fn update(&self, id: i64, patch: E::Patch) -> Result<Option<E>, DbError>;

    /// Permanently remove a record. `false` when the id does not exist.
    async fn destroy(&self, id: i64) -> Result<bool, DbError>;

    /// Total number of records.
    async fn count(&self) -> Result<i64, DbError>;
}

/// Attach grouped courses to records, keyed by owner id.
pub(crate) fn attach_courses<E: Resource>(
    records: Vec<E>,
    mut courses: HashMap<i64, Vec<Course>>,
) -> Vec<WithCourses<E>> {
    records
        .into_iter()
        .map(|record| {
            let linked = courses.remove(&record.id()).unwrap_or_default();
            WithCourses::joined(record, linked)
        })
        .collect()
}

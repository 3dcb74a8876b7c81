//! Generic resource abstraction
//!
//! Student, Teacher and Course share one CRUD contract. Each entity
//! describes itself through [`Resource`]; handlers and repositories are
//! written once against the trait.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Course, ValidationError};

/// Which Course foreign key points at an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseLink {
    Student,
    Teacher,
}

impl CourseLink {
    /// Foreign key column on `courses`.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Student => "student_id",
            Self::Teacher => "teacher_id",
        }
    }

    /// Owner id stored on a course for this link.
    pub fn owner(&self, course: &Course) -> Option<i64> {
        match self {
            Self::Student => course.student_id,
            Self::Teacher => course.teacher_id,
        }
    }

    /// Clear the foreign key (ON DELETE SET NULL).
    pub fn detach(&self, course: &mut Course) {
        match self {
            Self::Student => course.student_id = None,
            Self::Teacher => course.teacher_id = None,
        }
    }
}

/// An entity exposed as a REST resource
pub trait Resource: Serialize + Clone + Send + Sync + Unpin + 'static {
    /// Create payload
    type Create: DeserializeOwned + Send + Sync + 'static;

    /// Partial update payload; `None` fields are left unchanged
    type Patch: DeserializeOwned + Send + Sync + 'static;

    /// Singular display name, e.g. `Student`
    const NAME: &'static str;

    /// Collection name, used as both route segment and table name
    const COLLECTION: &'static str;

    /// Course foreign key referencing this entity, if Courses can be joined
    const COURSES: Option<CourseLink>;

    fn id(&self) -> i64;
    fn name(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;

    fn validate_create(input: &Self::Create) -> Result<(), ValidationError>;
    fn validate_patch(patch: &Self::Patch) -> Result<(), ValidationError>;

    /// Build a record from a create payload and a freshly assigned id.
    fn from_create(id: i64, input: Self::Create, now: DateTime<Utc>) -> Self;

    /// Apply a partial patch and refresh `updated_at`.
    fn apply_patch(&mut self, patch: Self::Patch, now: DateTime<Utc>);

    /// Foreign keys held by this record.
    fn references(&self) -> Vec<(CourseLink, i64)> {
        Vec::new()
    }
}

//! Course entity - join target for students and teachers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::patch::nullable;
use super::validation::{optional_text, required_text};
use super::{CourseLink, Resource, ValidationError};

/// Course record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub student_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// POST /courses body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub name: String,
    pub student_id: Option<i64>,
    pub teacher_id: Option<i64>,
}

/// PUT /courses/{id} body; `null` unlinks an owner
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub student_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub teacher_id: Option<Option<i64>>,
}

impl Resource for Course {
    type Create = NewCourse;
    type Patch = CoursePatch;

    const NAME: &'static str = "Course";
    const COLLECTION: &'static str = "courses";
    const COURSES: Option<CourseLink> = None;

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn validate_create(input: &NewCourse) -> Result<(), ValidationError> {
        required_text("name", &input.name)
    }

    fn validate_patch(patch: &CoursePatch) -> Result<(), ValidationError> {
        optional_text("name", patch.name.as_deref())
    }

    fn from_create(id: i64, input: NewCourse, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name.trim().to_owned(),
            student_id: input.student_id,
            teacher_id: input.teacher_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: CoursePatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_owned();
        }
        if let Some(student_id) = patch.student_id {
            self.student_id = student_id;
        }
        if let Some(teacher_id) = patch.teacher_id {
            self.teacher_id = teacher_id;
        }
        self.updated_at = now;
    }

    fn references(&self) -> Vec<(CourseLink, i64)> {
        let mut refs = Vec::new();
        if let Some(id) = self.student_id {
            refs.push((CourseLink::Student, id));
        }
        if let Some(id) = self.teacher_id {
            refs.push((CourseLink::Teacher, id));
        }
        refs
    }
}

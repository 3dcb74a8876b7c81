//! Teacher entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::{optional_text, required_text};
use super::{CourseLink, Resource, ValidationError};

/// Teacher record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: i64,
    pub name: String,
    pub department: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// POST /teachers body
#[derive(Debug, Clone, Deserialize)]
pub struct NewTeacher {
    pub name: String,
    pub department: String,
}

/// PUT /teachers/{id} body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeacherPatch {
    pub name: Option<String>,
    pub department: Option<String>,
}

impl Resource for Teacher {
    type Create = NewTeacher;
    type Patch = TeacherPatch;

    const NAME: &'static str = "Teacher";
    const COLLECTION: &'static str = "teachers";
    const COURSES: Option<CourseLink> = Some(CourseLink::Teacher);

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

    fn validate_create(input: &NewTeacher) -> Result<(), ValidationError> {
        required_text("name", &input.name)?;
        required_text("department", &input.department)
    }

    fn validate_patch(patch: &TeacherPatch) -> Result<(), ValidationError> {
        optional_text("name", patch.name.as_deref())?;
        optional_text("department", patch.department.as_deref())
    }

    fn from_create(id: i64, input: NewTeacher, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name.trim().to_owned(),
            department: input.department.trim().to_owned(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: TeacherPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_owned();
        }
        if let Some(department) = patch.department {
            self.department = department.trim().to_owned();
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_is_required() {
        let err = Teacher::validate_create(&NewTeacher {
            name: "Ada".into(),
            department: "".into(),
        })
        .unwrap_err();
        assert!(matches!(err, ValidationError::Empty { field: "department" }));
    }

    #[test]
    fn empty_patch_is_valid() {
        assert!(Teacher::validate_patch(&TeacherPatch::default()).is_ok());
        assert!(Teacher::validate_patch(&TeacherPatch {
            department: Some(" ".into()),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn patch_keeps_department() {
        let now = Utc::now();
        let mut teacher = Teacher::from_create(
            1,
            NewTeacher {
                name: " Ada ".into(),
                department: "Mathematics".into(),
            },
            now,
        );
        assert_eq!(teacher.name, "Ada");

        teacher.apply_patch(
            TeacherPatch {
                name: Some("Grace".into()),
                department: None,
            },
            now,
        );
        assert_eq!(teacher.name, "Grace");
        assert_eq!(teacher.department, "Mathematics");
    }
}

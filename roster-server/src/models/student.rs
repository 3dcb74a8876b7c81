//! Student entity

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::patch::nullable;
use super::validation::{optional_text, required_text};
use super::{CourseLink, Resource, ValidationError};

/// Loose address shape: something@something.tld, no whitespace
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex"));

const MAX_AGE: i32 = 150;

/// Student record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// POST /students body
#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub email: Option<String>,
    pub age: Option<i32>,
}

/// PUT /students/{id} body; `null` clears `email` / `age`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub age: Option<Option<i32>>,
}

fn check_email(email: Option<&str>) -> Result<(), ValidationError> {
    match email {
        Some(e) if !EMAIL_RE.is_match(e) => Err(ValidationError::InvalidFormat {
            field: "email",
            reason: "must be a valid email address",
        }),
        _ => Ok(()),
    }
}

fn check_age(age: Option<i32>) -> Result<(), ValidationError> {
    match age {
        Some(a) if !(1..=MAX_AGE).contains(&a) => Err(ValidationError::InvalidFormat {
            field: "age",
            reason: "must be between 1 and 150",
        }),
        _ => Ok(()),
    }
}

impl Resource for Student {
    type Create = NewStudent;
    type Patch = StudentPatch;

    const NAME: &'static str = "Student";
    const COLLECTION: &'static str = "students";
    const COURSES: Option<CourseLink> = Some(CourseLink::Student);

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

    fn validate_create(input: &NewStudent) -> Result<(), ValidationError> {
        required_text("name", &input.name)?;
        check_email(input.email.as_deref())?;
        check_age(input.age)
    }

    fn validate_patch(patch: &StudentPatch) -> Result<(), ValidationError> {
        optional_text("name", patch.name.as_deref())?;
        check_email(patch.email.as_ref().and_then(Option::as_deref))?;
        check_age(patch.age.flatten())
    }

    fn from_create(id: i64, input: NewStudent, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name.trim().to_owned(),
            email: input.email,
            age: input.age,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: StudentPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_owned();
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
        self.updated_at = now;
    }
}

//! Domain models with validation
//!
//! Payloads are checked explicitly before they reach a repository.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod patch;
pub mod resource;
pub mod student;
pub mod teacher;
pub mod course;
pub mod query;
pub mod pagination;

pub use validation::ValidationError;
pub use resource::{CourseLink, Resource};
pub use student::{NewStudent, Student, StudentPatch};
pub use teacher::{NewTeacher, Teacher, TeacherPatch};
pub use course::{Course, CoursePatch, NewCourse};
pub use query::{ListParams, ListQuery, SortColumn, SortOrder};
pub use pagination::{Envelope, PageMeta, WithCourses};

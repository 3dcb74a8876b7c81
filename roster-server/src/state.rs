//! Application state shared across handlers

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::{MemoryDatabase, PgRepository, Repository};
use crate::models::{Course, Student, Teacher};

/// One repository per resource, behind trait objects so the HTTP layer
/// does not care which backend is in use.
#[derive(Clone)]
pub struct AppState {
    pub students: Arc<dyn Repository<Student>>,
    pub teachers: Arc<dyn Repository<Teacher>>,
    pub courses: Arc<dyn Repository<Course>>,
}

impl AppState {
    /// PostgreSQL-backed repositories sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            students: Arc::new(PgRepository::<Student>::new(pool.clone())),
            teachers: Arc::new(PgRepository::<Teacher>::new(pool.clone())),
            courses: Arc::new(PgRepository::<Course>::new(pool)),
        }
    }

    /// In-memory repositories sharing one set of tables.
    pub fn memory(db: MemoryDatabase) -> Self {
        Self {
            students: Arc::new(db.repository::<Student>()),
            teachers: Arc::new(db.repository::<Teacher>()),
            courses: Arc::new(db.repository::<Course>()),
        }
    }
}

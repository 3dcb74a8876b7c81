//! Schema setup for students, teachers and courses
//!
//! Every statement is idempotent so `run` is safe on each startup.

use sqlx::PgPool;

use super::DbError;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS students (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL CHECK (length(trim(name)) > 0),
        email TEXT,
        age INTEGER CHECK (age BETWEEN 1 AND 150),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS teachers (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL CHECK (length(trim(name)) > 0),
        department TEXT NOT NULL CHECK (length(trim(department)) > 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS courses (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL CHECK (length(trim(name)) > 0),
        student_id BIGINT REFERENCES students(id) ON DELETE SET NULL,
        teacher_id BIGINT REFERENCES teachers(id) ON DELETE SET NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_courses_student_id ON courses(student_id)",
    "CREATE INDEX IF NOT EXISTS idx_courses_teacher_id ON courses(teacher_id)",
];

/// Create tables and indexes that do not exist yet.
pub async fn run(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("Running roster migrations...");

    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!(statements = STATEMENTS.len(), "Migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn courses_created_after_owners() {
        let pos = |needle: &str| {
            STATEMENTS
                .iter()
                .position(|s| s.contains(needle))
                .expect("statement missing")
        };
        assert!(pos("TABLE IF NOT EXISTS courses") > pos("TABLE IF NOT EXISTS students"));
        assert!(pos("TABLE IF NOT EXISTS courses") > pos("TABLE IF NOT EXISTS teachers"));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn migrations_are_idempotent() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = super::super::create_pool(&url).await.expect("pool creation failed");

        run(&pool).await.expect("first run");
        run(&pool).await.expect("second run");
    }
}

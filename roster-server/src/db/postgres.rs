//! PostgreSQL repository
//!
//! Reads are generic over [`Resource`]; writes are built per entity with
//! `QueryBuilder` so a patch only touches the columns it carries.

use std::collections::HashMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::repo::{attach_courses, DbError, Repository};
use crate::models::{
    Course, CourseLink, CoursePatch, ListQuery, NewCourse, NewStudent, NewTeacher, Resource,
    SortColumn, Student, StudentPatch, Teacher, TeacherPatch, WithCourses,
};

/// Entity that knows how to write itself to PostgreSQL
pub trait PgResource: Resource + for<'r> FromRow<'r, PgRow> {
    /// `INSERT ... RETURNING *` for a create payload.
    fn insert_query(input: Self::Create) -> QueryBuilder<'static, Postgres>;

    /// `UPDATE ... RETURNING *` setting only the supplied fields; a supplied
    /// `null` binds NULL.
    fn update_query(id: i64, patch: Self::Patch) -> QueryBuilder<'static, Postgres>;
}

fn finish_update(qb: &mut QueryBuilder<'static, Postgres>, id: i64) {
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" RETURNING *");
}

impl PgResource for Student {
    fn insert_query(input: NewStudent) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("INSERT INTO students (name, email, age) VALUES (");
        qb.push_bind(input.name.trim().to_owned())
            .push(", ")
            .push_bind(input.email)
            .push(", ")
            .push_bind(input.age)
            .push(") RETURNING *");
        qb
    }

    fn update_query(id: i64, patch: StudentPatch) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("UPDATE students SET updated_at = NOW()");
        if let Some(name) = patch.name {
            qb.push(", name = ").push_bind(name.trim().to_owned());
        }
        if let Some(email) = patch.email {
            qb.push(", email = ").push_bind(email);
        }
        if let Some(age) = patch.age {
            qb.push(", age = ").push_bind(age);
        }
        finish_update(&mut qb, id);
        qb
    }
}

impl PgResource for Teacher {
    fn insert_query(input: NewTeacher) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("INSERT INTO teachers (name, department) VALUES (");
        qb.push_bind(input.name.trim().to_owned())
            .push(", ")
            .push_bind(input.department.trim().to_owned())
            .push(") RETURNING *");
        qb
    }

    fn update_query(id: i64, patch: TeacherPatch) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("UPDATE teachers SET updated_at = NOW()");
        if let Some(name) = patch.name {
            qb.push(", name = ").push_bind(name.trim().to_owned());
        }
        if let Some(department) = patch.department {
            qb.push(", department = ").push_bind(department.trim().to_owned());
        }
        finish_update(&mut qb, id);
        qb
    }
}

impl PgResource for Course {
    fn insert_query(input: NewCourse) -> QueryBuilder<'static, Postgres> {
        let mut qb =
            QueryBuilder::new("INSERT INTO courses (name, student_id, teacher_id) VALUES (");
        qb.push_bind(input.name.trim().to_owned())
            .push(", ")
            .push_bind(input.student_id)
            .push(", ")
            .push_bind(input.teacher_id)
            .push(") RETURNING *");
        qb
    }

    fn update_query(id: i64, patch: CoursePatch) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("UPDATE courses SET updated_at = NOW()");
        if let Some(name) = patch.name {
            qb.push(", name = ").push_bind(name.trim().to_owned());
        }
        if let Some(student_id) = patch.student_id {
            qb.push(", student_id = ").push_bind(student_id);
        }
        if let Some(teacher_id) = patch.teacher_id {
            qb.push(", teacher_id = ").push_bind(teacher_id);
        }
        finish_update(&mut qb, id);
        qb
    }
}

/// `ORDER BY` clause from whitelisted parts, with `id` as tie-breaker.
fn order_clause(query: &ListQuery) -> String {
    if query.sort == SortColumn::Id {
        format!(" ORDER BY id {}", query.order)
    } else {
        format!(" ORDER BY {} {}, id ASC", query.sort.column(), query.order)
    }
}

/// Repository for any [`PgResource`]
pub struct PgRepository<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> PgRepository<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

impl<E> Clone for PgRepository<E> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<E: PgResource> PgRepository<E> {
    /// Courses for a set of owners in one query, grouped by owner id.
    async fn courses_for(
        &self,
        link: CourseLink,
        owner_ids: Vec<i64>,
    ) -> Result<HashMap<i64, Vec<Course>>, DbError> {
        let mut grouped: HashMap<i64, Vec<Course>> = HashMap::new();
        if owner_ids.is_empty() {
            return Ok(grouped);
        }

        let sql = format!(
            "SELECT * FROM courses WHERE {} = ANY($1) ORDER BY id",
            link.column()
        );
        let courses: Vec<Course> = sqlx::query_as(&sql)
            .bind(owner_ids)
            .fetch_all(&self.pool)
            .await?;

        for course in courses {
            if let Some(owner) = link.owner(&course) {
                grouped.entry(owner).or_default().push(course);
            }
        }
        Ok(grouped)
    }

    async fn join(&self, records: Vec<E>, include: bool) -> Result<Vec<WithCourses<E>>, DbError> {
        match E::COURSES {
            Some(link) if include => {
                let ids = records.iter().map(E::id).collect();
                let courses = self.courses_for(link, ids).await?;
                Ok(attach_courses(records, courses))
            }
            _ => Ok(records.into_iter().map(WithCourses::bare).collect()),
        }
    }
}

#[async_trait]
impl<E: PgResource> Repository<E> for PgRepository<E> {
    async fn create(&self, input: E::Create) -> Result<E, DbError> {
        let mut qb = E::insert_query(input);
        let record = qb.build_query_as::<E>().fetch_one(&self.pool).await?;
        tracing::debug!(entity = E::NAME, id = record.id(), "inserted");
        Ok(record)
    }

    async fn find_all(&self, query: &ListQuery) -> Result<Vec<WithCourses<E>>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT * FROM {}", E::COLLECTION));
        qb.push(order_clause(query));
        qb.push(" LIMIT ").push_bind(query.limit as i64);
        qb.push(" OFFSET ").push_bind(query.offset() as i64);

        let records = qb.build_query_as::<E>().fetch_all(&self.pool).await?;
        self.join(records, query.include_courses).await
    }

    async fn find_by_pk(
        &self,
        id: i64,
        include_courses: bool,
    ) -> Result<Option<WithCourses<E>>, DbError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", E::COLLECTION);
        let record: Option<E> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match record {
            Some(record) => Ok(self.join(vec![record], include_courses).await?.pop()),
            None => Ok(None),
        }
    }

    async fn update(&self, id: i64, patch: E::Patch) -> Result<Option<E>, DbError> {
        let mut qb = E::update_query(id, patch);
        let record = qb
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn destroy(&self, id: i64) -> Result<bool, DbError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", E::COLLECTION);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, DbError> {
        let sql = format!("SELECT COUNT(*) FROM {}", E::COLLECTION);
        let total: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListParams, SortOrder};
    use sqlx::Execute;

    #[test]
    fn patch_only_sets_supplied_columns() {
        let mut qb = Student::update_query(
            4,
            StudentPatch {
                name: Some("Grace".into()),
                ..Default::default()
            },
        );
        let sql = qb.build().sql().to_owned();

        assert!(sql.starts_with("UPDATE students SET updated_at = NOW(), name = $1"));
        assert!(!sql.contains("email"));
        assert!(!sql.contains("age"));
        assert!(sql.contains("WHERE id = $2"));
    }

    #[test]
    fn null_patch_still_sets_column() {
        let patch: CoursePatch = serde_json::from_str(r#"{"teacherId": null}"#).unwrap();
        let mut qb = Course::update_query(9, patch);
        let sql = qb.build().sql().to_owned();

        assert_eq!(
            sql,
            "UPDATE courses SET updated_at = NOW(), teacher_id = $1 WHERE id = $2 RETURNING *"
        );
    }

    #[test]
    fn insert_binds_every_column() {
        let mut qb = Teacher::insert_query(NewTeacher {
            name: "Ada".into(),
            department: "Mathematics".into(),
        });
        let sql = qb.build().sql().to_owned();
        assert_eq!(
            sql,
            "INSERT INTO teachers (name, department) VALUES ($1, $2) RETURNING *"
        );
    }

    #[test]
    fn order_clause_uses_whitelist() {
        let query = ListQuery::try_from(ListParams {
            sort_by: Some("updatedAt".into()),
            order: Some("DESC".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(order_clause(&query), " ORDER BY updated_at DESC, id ASC");

        let query = ListQuery {
            order: SortOrder::Desc,
            ..Default::default()
        };
        assert_eq!(order_clause(&query), " ORDER BY id DESC");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn student_round_trip() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = super::super::create_pool(&url).await.expect("pool creation failed");
        super::super::migrations::run(&pool).await.expect("migrations");

        let repo = PgRepository::<Student>::new(pool);
        let created = repo
            .create(NewStudent {
                name: "Ada".into(),
                email: None,
                age: Some(30),
            })
            .await
            .expect("create");

        let patched = repo
            .update(
                created.id,
                StudentPatch {
                    name: Some("Grace".into()),
                    ..Default::default()
                },
            )
            .await
            .expect("update")
            .expect("row exists");
        assert_eq!(patched.name, "Grace");
        assert_eq!(patched.age, Some(30));

        assert!(repo.destroy(created.id).await.expect("destroy"));
        assert!(repo.find_by_pk(created.id, true).await.expect("find").is_none());
    }
}

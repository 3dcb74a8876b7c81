//! In-memory repository
//!
//! Mirrors the PostgreSQL backend closely enough to serve the same API:
//! generated ids, `ON DELETE SET NULL` on course owners, and foreign key
//! checks on course writes. Used by tests and by `serve --memory`.
//!
//! Name sorting folds case first, approximating the case-insensitive
//! ordering of the usual PostgreSQL locale collations. Exact byte order
//! only breaks ties.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::repo::{attach_courses, DbError, Repository};
use crate::models::{
    Course, CourseLink, ListQuery, Resource, SortColumn, SortOrder, Student, Teacher, WithCourses,
};

/// One table: rows by id plus the next id to hand out
#[derive(Debug)]
pub struct Table<E> {
    next_id: i64,
    rows: BTreeMap<i64, E>,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

/// All tables behind a single lock
#[derive(Debug, Default)]
pub struct Tables {
    students: Table<Student>,
    teachers: Table<Teacher>,
    courses: Table<Course>,
}

impl Tables {
    fn owner_exists(&self, link: CourseLink, id: i64) -> bool {
        match link {
            CourseLink::Student => self.students.rows.contains_key(&id),
            CourseLink::Teacher => self.teachers.rows.contains_key(&id),
        }
    }

    fn check_references<E: Resource>(&self, record: &E) -> Result<(), DbError> {
        for (link, id) in record.references() {
            if !self.owner_exists(link, id) {
                return Err(DbError::Constraint(format!(
                    "insert or update on table \"{}\" violates foreign key constraint on {}: key ({})=({}) is not present",
                    E::COLLECTION,
                    link.column(),
                    link.column(),
                    id
                )));
            }
        }
        Ok(())
    }

    fn courses_for(&self, link: CourseLink, owner_ids: &[i64]) -> HashMap<i64, Vec<Course>> {
        let mut grouped: HashMap<i64, Vec<Course>> = HashMap::new();
        for course in self.courses.rows.values() {
            if let Some(owner) = link.owner(course) {
                if owner_ids.contains(&owner) {
                    grouped.entry(owner).or_default().push(course.clone());
                }
            }
        }
        grouped
    }

    fn detach_courses(&mut self, link: CourseLink, owner_id: i64) {
        for course in self.courses.rows.values_mut() {
            if link.owner(course) == Some(owner_id) {
                link.detach(course);
            }
        }
    }
}

/// Entity stored in [`Tables`]
pub trait MemoryResource: Resource {
    fn table(tables: &Tables) -> &Table<Self>;
    fn table_mut(tables: &mut Tables) -> &mut Table<Self>;
}

impl MemoryResource for Student {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.students
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.students
    }
}

impl MemoryResource for Teacher {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.teachers
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.teachers
    }
}

impl MemoryResource for Course {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.courses
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.courses
    }
}

/// Shared handle to the in-memory tables
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository over one of the tables.
    pub fn repository<E: MemoryResource>(&self) -> MemoryRepository<E> {
        MemoryRepository {
            db: self.clone(),
            _entity: PhantomData,
        }
    }
}

/// Repository for any [`MemoryResource`]
pub struct MemoryRepository<E> {
    db: MemoryDatabase,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for MemoryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _entity: PhantomData,
        }
    }
}

fn compare<E: Resource>(a: &E, b: &E, sort: SortColumn, order: SortOrder) -> Ordering {
    let primary = match sort {
        SortColumn::Id => a.id().cmp(&b.id()),
        SortColumn::Name => a
            .name()
            .to_lowercase()
            .cmp(&b.name().to_lowercase())
            .then_with(|| a.name().cmp(b.name())),
        SortColumn::CreatedAt => a.created_at().cmp(&b.created_at()),
        SortColumn::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
    };
    let primary = match order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };
    primary.then_with(|| a.id().cmp(&b.id()))
}

fn join<E: Resource>(tables: &Tables, records: Vec<E>, include: bool) -> Vec<WithCourses<E>> {
    match E::COURSES {
        Some(link) if include => {
            let ids: Vec<i64> = records.iter().map(E::id).collect();
            attach_courses(records, tables.courses_for(link, &ids))
        }
        _ => records.into_iter().map(WithCourses::bare).collect(),
    }
}

#[async_trait]
impl<E: MemoryResource> Repository<E> for MemoryRepository<E> {
    async fn create(&self, input: E::Create) -> Result<E, DbError> {
        let mut tables = self.db.tables.write().await;

        let id = E::table(&tables).next_id;
        let record = E::from_create(id, input, Utc::now());
        tables.check_references(&record)?;

        let table = E::table_mut(&mut tables);
        table.next_id += 1;
        table.rows.insert(id, record.clone());

        tracing::debug!(entity = E::NAME, id, "inserted");
        Ok(record)
    }

    async fn find_all(&self, query: &ListQuery) -> Result<Vec<WithCourses<E>>, DbError> {
        let tables = self.db.tables.read().await;

        let mut records: Vec<E> = E::table(&tables).rows.values().cloned().collect();
        records.sort_by(|a, b| compare(a, b, query.sort, query.order));

        let page: Vec<E> = records
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect();

        Ok(join(&tables, page, query.include_courses))
    }

    async fn find_by_pk(
        &self,
        id: i64,
        include_courses: bool,
    ) -> Result<Option<WithCourses<E>>, DbError> {
        let tables = self.db.tables.read().await;

        let record = match E::table(&tables).rows.get(&id) {
            Some(record) => record.clone(),
            None => return Ok(None),
        };
        Ok(join(&tables, vec![record], include_courses).pop())
    }

    async fn update(&self, id: i64, patch: E::Patch) -> Result<Option<E>, DbError> {
        let mut tables = self.db.tables.write().await;

        let mut record = match E::table(&tables).rows.get(&id) {
            Some(record) => record.clone(),
            None => return Ok(None),
        };
        record.apply_patch(patch, Utc::now());
        tables.check_references(&record)?;

        E::table_mut(&mut tables).rows.insert(id, record.clone());
        Ok(Some(record))
    }

    async fn destroy(&self, id: i64) -> Result<bool, DbError> {
        let mut tables = self.db.tables.write().await;

        if E::table_mut(&mut tables).rows.remove(&id).is_none() {
            return Ok(false);
        }
        if let Some(link) = E::COURSES {
            tables.detach_courses(link, id);
        }
        Ok(true)
    }

    async fn count(&self) -> Result<i64, DbError> {
        let tables = self.db.tables.read().await;
        Ok(E::table(&tables).rows.len() as i64)
    }
}

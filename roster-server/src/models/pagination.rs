//! Response envelopes for list and join results

use serde::Serialize;

use super::{Course, ListQuery};

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Total count across all pages
    pub total_items: i64,
    /// Current page number
    pub page: u32,
    /// Items per page
    pub limit: u32,
    pub total_pages: u32,
}

impl PageMeta {
    pub fn new(query: &ListQuery, total_items: i64) -> Self {
        Self {
            total_items,
            page: query.page,
            limit: query.limit,
            total_pages: query.total_pages(total_items),
        }
    }
}

/// Paginated list response
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub meta: PageMeta,
    pub data: Vec<T>,
}

/// A record with its Course relation optionally attached.
///
/// The `Course` key is omitted when the join was not requested, and is an
/// empty array when it was requested but nothing is linked.
#[derive(Debug, Clone, Serialize)]
pub struct WithCourses<T> {
    #[serde(flatten)]
    pub record: T,
    #[serde(rename = "Course", skip_serializing_if = "Option::is_none")]
    pub courses: Option<Vec<Course>>,
}

impl<T> WithCourses<T> {
    pub fn bare(record: T) -> Self {
        Self {
            record,
            courses: None,
        }
    }

    pub fn joined(record: T, courses: Vec<Course>) -> Self {
        Self {
            record,
            courses: Some(courses),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListParams;
    use serde_json::json;

    #[test]
    fn meta_serializes_camel_case() {
        let query = ListQuery::try_from(ListParams {
            limit: Some("2".into()),
            ..Default::default()
        })
        .unwrap();
        let meta = PageMeta::new(&query, 5);

        assert_eq!(
            serde_json::to_value(meta).unwrap(),
            json!({"totalItems": 5, "page": 1, "limit": 2, "totalPages": 3})
        );
    }

    #[test]
    fn course_key_omitted_without_join() {
        let value = serde_json::to_value(WithCourses::bare(json!({"id": 1}))).unwrap();
        assert_eq!(value, json!({"id": 1}));

        let value = serde_json::to_value(WithCourses::joined(json!({"id": 1}), vec![])).unwrap();
        assert_eq!(value, json!({"id": 1, "Course": []}));
    }
}

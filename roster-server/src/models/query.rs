//! List query parameters
//!
//! Raw query strings are accepted as-is and normalised here:
//! - `page` / `limit` fall back to their defaults when missing or unparsable
//! - `sortBy` / `order` are checked against a whitelist before reaching SQL
//! - `populate` is a comma-separated relation list, only `Course` is known

use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Default page number
pub const DEFAULT_PAGE: u32 = 1;

/// Default items per page
pub const DEFAULT_LIMIT: u32 = 10;

/// Maximum items per page
pub const MAX_LIMIT: u32 = 100;

/// Relation name recognised by `populate`
pub const COURSE_RELATION: &str = "Course";

/// Columns a listing may be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

impl SortColumn {
    /// SQL column name.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl FromStr for SortColumn {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "createdAt" => Ok(Self::CreatedAt),
            "updatedAt" => Ok(Self::UpdatedAt),
            other => Err(ValidationError::InvalidVariant {
                field: "sortBy",
                value: other.to_owned(),
            }),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Self::Desc)
        } else {
            Err(ValidationError::InvalidVariant {
                field: "order",
                value: s.to_owned(),
            })
        }
    }
}

/// Query string for list endpoints, exactly as received
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub populate: Option<String>,
}

impl ListParams {
    /// Collect known keys from decoded query pairs.
    ///
    /// A repeated key keeps its first value; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut params.page,
                "limit" => &mut params.limit,
                "sortBy" => &mut params.sort_by,
                "order" => &mut params.order,
                "populate" => &mut params.populate,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }
}

/// Normalised list query handed to a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    /// Page number (1-indexed)
    pub page: u32,
    /// Items per page (1..=100)
    pub limit: u32,
    pub sort: SortColumn,
    pub order: SortOrder,
    /// Eager-load the Course relation
    pub include_courses: bool,
}

impl ListQuery {
    /// Calculate SQL OFFSET value.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// Number of pages needed for `total` records at this page size.
    pub fn total_pages(&self, total: i64) -> u32 {
        if total <= 0 {
            return 0;
        }
        let total = total as u64;
        let limit = self.limit as u64;
        total.div_ceil(limit) as u32
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: SortColumn::default(),
            order: SortOrder::default(),
            include_courses: false,
        }
    }
}

impl TryFrom<ListParams> for ListQuery {
    type Error = ValidationError;

    fn try_from(params: ListParams) -> Result<Self, Self::Error> {
        let sort = match non_blank(params.sort_by.as_deref()) {
            Some(s) => s.parse()?,
            None => SortColumn::default(),
        };
        let order = match non_blank(params.order.as_deref()) {
            Some(s) => s.parse()?,
            None => SortOrder::default(),
        };

        Ok(Self {
            page: positive_or(params.page.as_deref(), DEFAULT_PAGE),
            limit: positive_or(params.limit.as_deref(), DEFAULT_LIMIT).min(MAX_LIMIT),
            sort,
            order,
            include_courses: params
                .populate
                .as_deref()
                .map(populates_courses)
                .unwrap_or(false),
        })
    }
}

/// Whether a `populate` list names the Course relation.
pub fn populates_courses(populate: &str) -> bool {
    populate
        .split(',')
        .map(str::trim)
        .any(|relation| relation == COURSE_RELATION)
}

fn positive_or(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

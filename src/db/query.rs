//! Filtered, paginated listing queries for the `events` table.
//!
//! The data query and the count query are rendered from the same
//! [`EventListQuery`] and bound through the same [`EventListQuery::bind_filter`],
//! so they always share one predicate and one parameter value.

use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::QueryAs;

use crate::models::{Event, PageMeta};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Column list shared by every statement that returns full rows.
pub const EVENT_COLUMNS: &str = "id, title, description, location, start_date, end_date, \
     is_online, capacity, created_at, updated_at";

const SEARCH_PREDICATE: &str =
    "WHERE title ILIKE $1 OR description ILIKE $1 OR location ILIKE $1";

/// Normalized page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    limit: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta {
            page: self.page,
            limit: self.limit,
            total,
            total_pages: total_pages(total, self.limit),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

/// `ceil(total / limit)`; an empty result has zero pages.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    total / limit + i64::from(total % limit != 0)
}

/// Case-insensitive substring match over title, description and location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    needle: String,
    pattern: String,
}

impl SearchFilter {
    /// Returns `None` when the search text is absent or blank.
    pub fn parse(search: Option<&str>) -> Option<Self> {
        let term = search.map(str::trim).filter(|s| !s.is_empty())?;
        Some(Self {
            needle: term.to_lowercase(),
            pattern: format!("%{}%", escape_like(term)),
        })
    }

    /// The single `ILIKE` parameter shared by all three comparisons.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, event: &Event) -> bool {
        let hit = |value: &str| value.to_lowercase().contains(&self.needle);
        hit(&event.title)
            || event.description.as_deref().is_some_and(hit)
            || event.location.as_deref().is_some_and(hit)
    }
}

// Postgres uses backslash as the default LIKE escape character.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// A listing request after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventListQuery {
    pub pagination: Pagination,
    pub filter: Option<SearchFilter>,
}

impl EventListQuery {
    pub fn new(page: i64, limit: i64, search: Option<&str>) -> Self {
        Self {
            pagination: Pagination::new(page, limit),
            filter: SearchFilter::parse(search),
        }
    }

    fn where_clause(&self) -> &'static str {
        if self.filter.is_some() {
            SEARCH_PREDICATE
        } else {
            ""
        }
    }

    /// Number of placeholders consumed by the filter.
    fn filter_params(&self) -> usize {
        usize::from(self.filter.is_some())
    }

    /// Row-fetch statement, newest first.
    pub fn select_sql(&self) -> String {
        let next = self.filter_params() + 1;
        format!(
            "SELECT {EVENT_COLUMNS} FROM events {} ORDER BY id DESC LIMIT ${} OFFSET ${}",
            self.where_clause(),
            next,
            next + 1
        )
    }

    /// Count statement over the same predicate, without the page window.
    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM events {}", self.where_clause())
    }

    /// Binds the filter parameter, if any, onto a statement rendered by this query.
    pub fn bind_filter<'q, O>(
        &'q self,
        query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        match &self.filter {
            Some(filter) => query.bind(filter.pattern()),
            None => query,
        }
    }
}

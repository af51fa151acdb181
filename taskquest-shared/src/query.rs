/// Owner-scoped search and pagination queries
///
/// Every statement rendered here starts from `WHERE e.user_id = $1`: rows of
/// other users can't be reached by any combination of keyword, filter or
/// page. Identifiers come from the static [`Schema`]; everything the caller
/// supplies is bound as a parameter.
///
/// # Example
///
/// ```
/// use taskquest_shared::models::task::TASK_SCHEMA;
/// use taskquest_shared::query::{Pagination, SearchQuery};
///
/// let query = SearchQuery::new(&TASK_SCHEMA, 7).keyword(Some("Clean"));
/// let page = query.select_page(Pagination::new(2, 5));
///
/// assert!(page.sql().contains("LIMIT"));
/// ```

use serde::Serialize;
use sqlx::{Postgres, QueryBuilder};

use crate::models::{Column, Schema};

/// Rows returned by the dropdown query
pub const DROPDOWN_LIMIT: i64 = 5;

/// One page of a listing plus the size of the whole result set
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub result: Vec<T>,
    pub total: i64,
}

/// Page/limit pair, both at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub const DEFAULT_PAGE: i64 = 1;
    pub const DEFAULT_LIMIT: i64 = 10;

    /// Clamps both values to at least 1
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Builds pagination from raw query-string values
    ///
    /// Missing or empty values take the defaults (1 and 10). Anything present
    /// but not a positive integer becomes 1. There is no upper bound on
    /// `limit`.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_positive(page, Self::DEFAULT_PAGE),
            limit: parse_positive(limit, Self::DEFAULT_LIMIT),
        }
    }

    /// Rows to skip before this page
    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Rows on this page
    pub fn take(&self) -> i64 {
        self.limit
    }
}

fn parse_positive(raw: Option<&str>, default: i64) -> i64 {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => default,
        Some(value) => value
            .parse::<i64>()
            .ok()
            .or_else(|| {
                // "2.0" and "2.9" both mean page 2
                value
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
            .map_or(1, |n| n.max(1)),
    }
}

/// Turns a keyword into a `LIKE` prefix pattern
///
/// `%`, `_` and `\` in the keyword match themselves.
pub fn like_prefix(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 1);

    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }

    pattern.push('%');
    pattern
}

/// How the parent task is joined into a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Rows without a (visible) task are dropped
    Inner,

    /// Rows without a task come back with `task = NULL`
    Left,
}

impl JoinKind {
    fn sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => " INNER JOIN tasks t ON t.id = e.task_id",
            JoinKind::Left => " LEFT JOIN tasks t ON t.id = e.task_id",
        }
    }
}

/// Builder for owner-scoped queries against one entity table
///
/// The entity table is aliased `e`; the joined task, if any, is `t`.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    schema: &'static Schema,
    owner_id: i64,
    fields: Vec<&'static Column>,
    keyword: Option<String>,
    filters: Vec<(&'static str, i64)>,
    join: Option<JoinKind>,
}

impl SearchQuery {
    /// Starts a query for `owner_id`'s rows, searching the schema's default
    /// fields and joining the task (LEFT) for entities that reference one
    pub fn new(schema: &'static Schema, owner_id: i64) -> Self {
        Self {
            schema,
            owner_id,
            fields: schema.searchable_columns(),
            keyword: None,
            filters: Vec::new(),
            join: schema.task_relation.then_some(JoinKind::Left),
        }
    }

    /// Replaces the fields the keyword is matched against
    pub fn fields(mut self, fields: Vec<&'static Column>) -> Self {
        self.fields = fields;
        self
    }

    /// Sets the search keyword; blank keywords are ignored
    pub fn keyword(mut self, keyword: Option<&str>) -> Self {
        self.keyword = keyword
            .filter(|k| !k.trim().is_empty())
            .map(str::to_string);
        self
    }

    /// Adds `AND e.<column> = value`
    ///
    /// `column` must be a column of the schema's table, never user input.
    pub fn filter(mut self, column: &'static str, value: i64) -> Self {
        self.filters.push((column, value));
        self
    }

    /// Sets how the parent task is joined; ignored for entities without one
    pub fn join_task(mut self, kind: JoinKind) -> Self {
        if self.schema.task_relation {
            self.join = Some(kind);
        }
        self
    }

    fn push_select_list(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        let mut separated = qb.separated(", ");

        for column in self.schema.columns {
            separated.push(format!("e.{}", column.column));
        }
        separated.push("e.user_id");
        separated.push("e.created_at");
        separated.push("e.updated_at");

        if self.join.is_some() {
            separated.push(
                "CASE WHEN t.id IS NULL THEN NULL \
                 ELSE json_build_object('id', t.id, 'taskName', t.task_name) END AS task",
            );
        }
    }

    fn push_from(&self, qb: &mut QueryBuilder<'static, Postgres>, with_join: bool) {
        qb.push(" FROM ");
        qb.push(self.schema.table);
        qb.push(" e");

        if let (true, Some(join)) = (with_join, self.join) {
            qb.push(join.sql());
        }
    }

    fn push_where(&self, qb: &mut QueryBuilder<'static, Postgres>, with_join: bool) {
        qb.push(" WHERE e.user_id = ");
        qb.push_bind(self.owner_id);

        for (column, value) in &self.filters {
            qb.push(" AND e.");
            qb.push(*column);
            qb.push(" = ");
            qb.push_bind(*value);
        }

        let Some(keyword) = &self.keyword else {
            return;
        };

        let search_task = with_join && self.join.is_some();
        if self.fields.is_empty() && !search_task {
            return;
        }

        let pattern = like_prefix(keyword);

        qb.push(" AND (");
        let mut first = true;
        for column in &self.fields {
            if !first {
                qb.push(" OR ");
            }
            first = false;

            qb.push("CAST(e.");
            qb.push(column.column);
            qb.push(" AS TEXT) LIKE ");
            qb.push_bind(pattern.clone());
        }

        if search_task {
            if !first {
                qb.push(" OR ");
            }
            qb.push("t.task_name LIKE ");
            qb.push_bind(pattern);
        }
        qb.push(")");
    }

    fn push_order(qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push(" ORDER BY e.created_at DESC, e.id DESC");
    }

    /// `SELECT` for a single row by id
    ///
    /// With `for_update` the entity row (not the joined task) is locked until
    /// the surrounding transaction ends.
    pub fn select_one(&self, id: i64, for_update: bool) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT ");
        self.push_select_list(&mut qb);
        self.push_from(&mut qb, true);
        self.push_where(&mut qb, true);
        qb.push(" AND e.id = ");
        qb.push_bind(id);

        if for_update {
            qb.push(" FOR UPDATE OF e");
        }

        qb
    }

    /// `SELECT` for one page, newest first
    pub fn select_page(&self, pagination: Pagination) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT ");
        self.push_select_list(&mut qb);
        self.push_from(&mut qb, true);
        self.push_where(&mut qb, true);
        Self::push_order(&mut qb);

        qb.push(" LIMIT ");
        qb.push_bind(pagination.take());
        qb.push(" OFFSET ");
        qb.push_bind(pagination.skip());

        qb
    }

    /// `SELECT COUNT(*)` over the same rows as [`select_page`](Self::select_page)
    pub fn count(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*)");
        self.push_from(&mut qb, true);
        self.push_where(&mut qb, true);
        qb
    }

    /// Dropdown query: `id` plus `fields`, each row one JSON object keyed by
    /// API field names, at most [`DROPDOWN_LIMIT`] rows
    ///
    /// The keyword is matched against `fields` only; the task isn't joined.
    pub fn dropdown(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT json_build_object('id', e.id");

        for column in self.fields.iter().filter(|c| c.column != "id") {
            qb.push(", '");
            qb.push(column.field);
            qb.push("', e.");
            qb.push(column.column);
        }
        qb.push(")");

        self.push_from(&mut qb, false);
        self.push_where(&mut qb, false);
        Self::push_order(&mut qb);

        qb.push(" LIMIT ");
        qb.push_bind(DROPDOWN_LIMIT);

        qb
    }
}

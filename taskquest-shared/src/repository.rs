/// Generic owner-scoped reads and deletes
///
/// `Repository<E>` runs the statements rendered by [`SearchQuery`] for any
/// [`Entity`]. Writes that depend on the payload type live on the entity
/// itself (`Entity::insert` / `Entity::save`).

use std::marker::PhantomData;

use sqlx::{PgConnection, PgPool};

use crate::models::{Column, Entity};
use crate::query::{JoinKind, Page, Pagination, SearchQuery};

pub struct Repository<E: Entity> {
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Repository<E> {
    fn query(owner_id: i64) -> SearchQuery {
        SearchQuery::new(E::schema(), owner_id)
    }

    /// Owned row by id, with its task summary when the entity has one
    pub async fn find_by_id(
        pool: &PgPool,
        owner_id: i64,
        id: i64,
    ) -> Result<Option<E>, sqlx::Error> {
        Self::query(owner_id)
            .join_task(JoinKind::Left)
            .select_one(id, false)
            .build_query_as::<E>()
            .fetch_optional(pool)
            .await
    }

    /// Same as [`find_by_id`](Self::find_by_id) but locks the row for the
    /// rest of the transaction `conn` belongs to
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        owner_id: i64,
        id: i64,
    ) -> Result<Option<E>, sqlx::Error> {
        Self::query(owner_id)
            .join_task(JoinKind::Left)
            .select_one(id, true)
            .build_query_as::<E>()
            .fetch_optional(conn)
            .await
    }

    async fn page(pool: &PgPool, query: SearchQuery, pagination: Pagination) -> Result<Page<E>, sqlx::Error> {
        let total: i64 = query
            .count()
            .build_query_scalar()
            .fetch_one(pool)
            .await?;

        let result = query
            .select_page(pagination)
            .build_query_as::<E>()
            .fetch_all(pool)
            .await?;

        Ok(Page { result, total })
    }

    /// Owned rows matching `keyword`, newest first
    ///
    /// Entities that reference a task only list rows whose task still
    /// exists, and the keyword also matches the task's name.
    pub async fn get_all(
        pool: &PgPool,
        owner_id: i64,
        pagination: Pagination,
        keyword: Option<&str>,
    ) -> Result<Page<E>, sqlx::Error> {
        let query = Self::query(owner_id)
            .join_task(JoinKind::Inner)
            .keyword(keyword);

        Self::page(pool, query, pagination).await
    }

    /// [`get_all`](Self::get_all) restricted to the children of one task
    pub async fn get_by_task(
        pool: &PgPool,
        owner_id: i64,
        task_id: i64,
        pagination: Pagination,
        keyword: Option<&str>,
    ) -> Result<Page<E>, sqlx::Error> {
        let query = Self::query(owner_id)
            .join_task(JoinKind::Inner)
            .filter("task_id", task_id)
            .keyword(keyword);

        Self::page(pool, query, pagination).await
    }

    /// Up to five `{id, ..fields}` objects for selection lists
    ///
    /// `fields` must already be resolved against the entity's schema.
    pub async fn find_all_dropdown(
        pool: &PgPool,
        owner_id: i64,
        fields: Vec<&'static Column>,
        keyword: Option<&str>,
    ) -> Result<Vec<serde_json::Value>, sqlx::Error> {
        Self::query(owner_id)
            .fields(fields)
            .keyword(keyword)
            .dropdown()
            .build_query_scalar::<serde_json::Value>()
            .fetch_all(pool)
            .await
    }

    /// Deletes an owned row, returning whether it existed
    pub async fn delete(conn: &mut PgConnection, owner_id: i64, id: i64) -> Result<bool, sqlx::Error> {
        let sql = format!("DELETE FROM {} WHERE id = $1 AND user_id = $2", E::schema().table);

        let result = sqlx::query(&sql)
            .bind(id)
            .bind(owner_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Whether `task_id` exists and belongs to `owner_id`
pub async fn task_belongs_to(
    conn: &mut PgConnection,
    owner_id: i64,
    task_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM tasks WHERE id = $1 AND user_id = $2)")
        .bind(task_id)
        .bind(owner_id)
        .fetch_one(conn)
        .await
}

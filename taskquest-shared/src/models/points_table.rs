/// Points table rows
///
/// A row says "points were credited for this task". It has no fields of its
/// own beyond the task reference, so listings can only be searched by the
/// parent task's name.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE points_tables (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     task_id BIGINT REFERENCES tasks(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgConnection};
use validator::Validate;

use super::{deserialize_some, Column, Entity, Schema, TaskSummary};

pub static POINTS_TABLE_SCHEMA: Schema = Schema {
    table: "points_tables",
    label: "Points table",
    columns: &[Column::new("id", "id"), Column::new("taskId", "task_id")],
    searchable: &[],
    dropdown_defaults: &["id"],
    task_relation: true,
};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PointsTable {
    pub id: i64,

    #[serde(skip_serializing)]
    pub user_id: i64,

    pub task_id: Option<i64>,

    pub task: Option<Json<TaskSummary>>,

    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePointsTable {
    #[serde(default)]
    pub task_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePointsTable {
    #[serde(default, deserialize_with = "deserialize_some")]
    pub task_id: Option<Option<i64>>,
}

#[async_trait]
impl Entity for PointsTable {
    type Create = CreatePointsTable;
    type Update = UpdatePointsTable;

    fn schema() -> &'static Schema {
        &POINTS_TABLE_SCHEMA
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn create_task_ref(data: &CreatePointsTable) -> Option<i64> {
        data.task_id
    }

    fn update_task_ref(data: &UpdatePointsTable) -> Option<i64> {
        data.task_id.flatten()
    }

    async fn insert(
        conn: &mut PgConnection,
        owner_id: i64,
        data: CreatePointsTable,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("INSERT INTO points_tables (user_id, task_id) VALUES ($1, $2) RETURNING id")
            .bind(owner_id)
            .bind(data.task_id)
            .fetch_one(conn)
            .await
    }

    fn merge(&mut self, data: UpdatePointsTable) {
        if let Some(task_id) = data.task_id {
            self.task_id = task_id;
        }
    }

    async fn save(&self, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE points_tables SET task_id = $3 WHERE id = $1 AND user_id = $2")
            .bind(self.id)
            .bind(self.user_id)
            .bind(self.task_id)
            .execute(conn)
            .await?;

        Ok(())
    }
}

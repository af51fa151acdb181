/// Daily to-do list entries
///
/// An entry records the status of one task on one day. `status` is free
/// text ("pending", "done", ...); nothing enforces a fixed set.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE daily_to_do_lists (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     task_id BIGINT REFERENCES tasks(id) ON DELETE CASCADE,
///     status VARCHAR(255) NOT NULL,
///     completion_date DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgConnection};
use validator::Validate;

use super::{deserialize_non_null, deserialize_some, Column, Entity, Schema, TaskSummary};

pub static DAILY_TO_DO_LIST_SCHEMA: Schema = Schema {
    table: "daily_to_do_lists",
    label: "Daily to-do list",
    columns: &[
        Column::new("id", "id"),
        Column::new("taskId", "task_id"),
        Column::new("status", "status"),
        Column::new("completionDate", "completion_date"),
    ],
    searchable: &["status", "completionDate"],
    dropdown_defaults: &["id"],
    task_relation: true,
};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailyToDoList {
    pub id: i64,

    #[serde(skip_serializing)]
    pub user_id: i64,

    pub task_id: Option<i64>,

    pub status: String,

    pub completion_date: Option<NaiveDate>,

    /// Parent task as `{id, taskName}`, `null` when unset
    pub task: Option<Json<TaskSummary>>,

    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDailyToDoList {
    #[serde(default)]
    pub task_id: Option<i64>,

    #[validate(length(min = 1, max = 255, message = "Status must be 1-255 characters"))]
    pub status: String,

    #[serde(default)]
    pub completion_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDailyToDoList {
    #[serde(default, deserialize_with = "deserialize_some")]
    pub task_id: Option<Option<i64>>,

    #[serde(default, deserialize_with = "deserialize_non_null")]
    #[validate(length(min = 1, max = 255, message = "Status must be 1-255 characters"))]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub completion_date: Option<Option<NaiveDate>>,
}

#[async_trait]
impl Entity for DailyToDoList {
    type Create = CreateDailyToDoList;
    type Update = UpdateDailyToDoList;

    fn schema() -> &'static Schema {
        &DAILY_TO_DO_LIST_SCHEMA
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn create_task_ref(data: &CreateDailyToDoList) -> Option<i64> {
        data.task_id
    }

    fn update_task_ref(data: &UpdateDailyToDoList) -> Option<i64> {
        data.task_id.flatten()
    }

    async fn insert(
        conn: &mut PgConnection,
        owner_id: i64,
        data: CreateDailyToDoList,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            INSERT INTO daily_to_do_lists (user_id, task_id, status, completion_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(data.task_id)
        .bind(data.status)
        .bind(data.completion_date)
        .fetch_one(conn)
        .await
    }

    fn merge(&mut self, data: UpdateDailyToDoList) {
        if let Some(task_id) = data.task_id {
            self.task_id = task_id;
        }
        if let Some(status) = data.status {
            self.status = status;
        }
        if let Some(completion_date) = data.completion_date {
            self.completion_date = completion_date;
        }
    }

    async fn save(&self, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE daily_to_do_lists
            SET task_id = $3,
                status = $4,
                completion_date = $5
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(self.id)
        .bind(self.user_id)
        .bind(self.task_id)
        .bind(&self.status)
        .bind(self.completion_date)
        .execute(conn)
        .await?;

        Ok(())
    }
}

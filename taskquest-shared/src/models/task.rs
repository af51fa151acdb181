/// Task model
///
/// A task is something the user does repeatedly for a number of points.
/// Daily to-do entries and points-table rows hang off a task and disappear
/// with it (`ON DELETE CASCADE`).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     task_name VARCHAR(255) NOT NULL,
///     points INTEGER NOT NULL,
///     date_created TIMESTAMPTZ,
///     date_updated TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use validator::Validate;

use super::{deserialize_non_null, deserialize_some, Column, Entity, Schema};

pub static TASK_SCHEMA: Schema = Schema {
    table: "tasks",
    label: "Task",
    columns: &[
        Column::new("id", "id"),
        Column::new("taskName", "task_name"),
        Column::new("points", "points"),
        Column::new("dateCreated", "date_created"),
        Column::new("dateUpdated", "date_updated"),
    ],
    searchable: &["taskName", "points", "dateCreated", "dateUpdated"],
    dropdown_defaults: &["id", "taskName"],
    task_relation: false,
};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,

    #[serde(skip_serializing)]
    pub user_id: i64,

    pub task_name: String,

    /// Points credited each time the task is completed
    pub points: i32,

    pub date_created: Option<DateTime<Utc>>,

    pub date_updated: Option<DateTime<Utc>>,

    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /v1/tasks`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    #[validate(length(min = 1, max = 255, message = "Task name must be 1-255 characters"))]
    pub task_name: String,

    pub points: i32,

    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,

    #[serde(default)]
    pub date_updated: Option<DateTime<Utc>>,
}

/// Body of `PUT /v1/tasks/:id`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[serde(default, deserialize_with = "deserialize_non_null")]
    #[validate(length(min = 1, max = 255, message = "Task name must be 1-255 characters"))]
    pub task_name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_non_null")]
    pub points: Option<i32>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub date_created: Option<Option<DateTime<Utc>>>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub date_updated: Option<Option<DateTime<Utc>>>,
}

#[async_trait]
impl Entity for Task {
    type Create = CreateTask;
    type Update = UpdateTask;

    fn schema() -> &'static Schema {
        &TASK_SCHEMA
    }

    fn id(&self) -> i64 {
        self.id
    }

    async fn insert(
        conn: &mut PgConnection,
        owner_id: i64,
        data: CreateTask,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            INSERT INTO tasks (user_id, task_name, points, date_created, date_updated)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(data.task_name)
        .bind(data.points)
        .bind(data.date_created)
        .bind(data.date_updated)
        .fetch_one(conn)
        .await
    }

    fn merge(&mut self, data: UpdateTask) {
        if let Some(task_name) = data.task_name {
            self.task_name = task_name;
        }
        if let Some(points) = data.points {
            self.points = points;
        }
        if let Some(date_created) = data.date_created {
            self.date_created = date_created;
        }
        if let Some(date_updated) = data.date_updated {
            self.date_updated = date_updated;
        }
    }

    async fn save(&self, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE tasks
            SET task_name = $3,
                points = $4,
                date_created = $5,
                date_updated = $6
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(self.id)
        .bind(self.user_id)
        .bind(&self.task_name)
        .bind(self.points)
        .bind(self.date_created)
        .bind(self.date_updated)
        .execute(conn)
        .await?;

        Ok(())
    }
}

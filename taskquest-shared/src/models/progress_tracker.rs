/// Progress trackers
///
/// Totals for a user. Trackers are plain records: nothing recomputes them
/// when tasks are completed, and a user may hold more than one.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE progress_trackers (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     total_points INTEGER NOT NULL,
///     completion_percentage DOUBLE PRECISION,
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

pub static PROGRESS_TRACKER_SCHEMA: Schema = Schema {
    table: "progress_trackers",
    label: "Progress tracker",
    columns: &[
        Column::new("id", "id"),
        Column::new("totalPoints", "total_points"),
        Column::new("completionPercentage", "completion_percentage"),
    ],
    searchable: &["totalPoints", "completionPercentage"],
    dropdown_defaults: &["id"],
    task_relation: false,
};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProgressTracker {
    pub id: i64,

    #[serde(skip_serializing)]
    pub user_id: i64,

    pub total_points: i32,

    /// 0 to 100
    pub completion_percentage: Option<f64>,

    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProgressTracker {
    pub total_points: i32,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0, message = "Completion percentage must be between 0 and 100"))]
    pub completion_percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressTracker {
    #[serde(default, deserialize_with = "deserialize_non_null")]
    pub total_points: Option<i32>,

    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(range(min = 0.0, max = 100.0, message = "Completion percentage must be between 0 and 100"))]
    pub completion_percentage: Option<Option<f64>>,
}

#[async_trait]
impl Entity for ProgressTracker {
    type Create = CreateProgressTracker;
    type Update = UpdateProgressTracker;

    fn schema() -> &'static Schema {
        &PROGRESS_TRACKER_SCHEMA
    }

    fn id(&self) -> i64 {
        self.id
    }

    async fn insert(
        conn: &mut PgConnection,
        owner_id: i64,
        data: CreateProgressTracker,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            INSERT INTO progress_trackers (user_id, total_points, completion_percentage)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(data.total_points)
        .bind(data.completion_percentage)
        .fetch_one(conn)
        .await
    }

    fn merge(&mut self, data: UpdateProgressTracker) {
        if let Some(total_points) = data.total_points {
            self.total_points = total_points;
        }
        if let Some(completion_percentage) = data.completion_percentage {
            self.completion_percentage = completion_percentage;
        }
    }

    async fn save(&self, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE progress_trackers
            SET total_points = $3,
                completion_percentage = $4
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(self.id)
        .bind(self.user_id)
        .bind(self.total_points)
        .bind(self.completion_percentage)
        .execute(conn)
        .await?;

        Ok(())
    }
}

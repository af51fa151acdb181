/// Generic CRUD service
///
/// `Service<E>` adds the business rules on top of [`Repository`]: existence
/// checks, task-reference ownership, the update transaction, and error
/// normalization into [`ServiceError`].
///
/// # Example
///
/// ```no_run
/// use taskquest_shared::query::Pagination;
/// use taskquest_shared::service::TaskService;
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let tasks = TaskService::new(pool);
/// let page = tasks.get_all(1, Pagination::new(1, 10), Some("Clean")).await?;
/// println!("{} of {} tasks", page.result.len(), page.total);
/// # Ok(())
/// # }
/// ```

use std::marker::PhantomData;

use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};

use crate::models::{
    daily_to_do_list::DailyToDoList, points_table::PointsTable,
    progress_tracker::ProgressTracker, task::Task, Entity, UnknownField,
};
use crate::query::{Page, Pagination};
use crate::repository::{task_belongs_to, Repository};

pub type TaskService = Service<Task>;
pub type DailyToDoListService = Service<DailyToDoList>;
pub type PointsTableService = Service<PointsTable>;
pub type ProgressTrackerService = Service<ProgressTracker>;

/// Error type for service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Row is absent or belongs to someone else
    #[error("{0}")]
    NotFound(String),

    /// Request is well-formed but refers to something it may not use
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

impl From<UnknownField> for ServiceError {
    fn from(err: UnknownField) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

pub struct Service<E: Entity> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Service<E> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<E: Entity> Service<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    fn not_found(id: i64) -> ServiceError {
        ServiceError::NotFound(format!("{} with id {} not found", E::schema().label, id))
    }

    async fn ensure_task_owned(
        conn: &mut PgConnection,
        owner_id: i64,
        task_id: Option<i64>,
    ) -> Result<(), ServiceError> {
        let Some(task_id) = task_id else {
            return Ok(());
        };

        if task_belongs_to(conn, owner_id, task_id).await? {
            Ok(())
        } else {
            Err(ServiceError::Validation(format!(
                "Task with id {} does not exist",
                task_id
            )))
        }
    }

    pub async fn get_by_id(&self, owner_id: i64, id: i64) -> Result<E, ServiceError> {
        Repository::<E>::find_by_id(&self.pool, owner_id, id)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    pub async fn get_all(
        &self,
        owner_id: i64,
        pagination: Pagination,
        keyword: Option<&str>,
    ) -> Result<Page<E>, ServiceError> {
        Ok(Repository::<E>::get_all(&self.pool, owner_id, pagination, keyword).await?)
    }

    /// Children of one of the caller's tasks
    ///
    /// # Errors
    ///
    /// `NotFound` if the task doesn't exist or isn't the caller's;
    /// `Validation` if the entity doesn't reference tasks.
    pub async fn get_by_task(
        &self,
        owner_id: i64,
        task_id: i64,
        pagination: Pagination,
        keyword: Option<&str>,
    ) -> Result<Page<E>, ServiceError> {
        if !E::schema().task_relation {
            return Err(ServiceError::Validation(format!(
                "{} rows are not attached to tasks",
                E::schema().label
            )));
        }

        let mut conn = self.pool.acquire().await?;
        if !task_belongs_to(&mut conn, owner_id, task_id).await? {
            return Err(ServiceError::NotFound(format!(
                "Task with id {} not found",
                task_id
            )));
        }
        drop(conn);

        Ok(Repository::<E>::get_by_task(&self.pool, owner_id, task_id, pagination, keyword).await?)
    }

    /// Dropdown rows; `fields` are API field names, empty means the entity's defaults
    ///
    /// # Errors
    ///
    /// `Validation` for a field the entity doesn't expose.
    pub async fn dropdown<S: AsRef<str>>(
        &self,
        owner_id: i64,
        fields: &[S],
        keyword: Option<&str>,
    ) -> Result<Vec<serde_json::Value>, ServiceError> {
        let schema = E::schema();
        let columns = if fields.is_empty() {
            schema.resolve_fields(schema.dropdown_defaults)?
        } else {
            schema.resolve_fields(fields)?
        };

        Ok(Repository::<E>::find_all_dropdown(&self.pool, owner_id, columns, keyword).await?)
    }

    pub async fn create(&self, owner_id: i64, data: E::Create) -> Result<E, ServiceError> {
        let mut tx = self.pool.begin().await?;

        Self::ensure_task_owned(&mut tx, owner_id, E::create_task_ref(&data)).await?;
        let id = E::insert(&mut tx, owner_id, data).await?;

        tx.commit().await?;

        info!(entity = E::schema().table, id, owner_id, "Created");
        self.get_by_id(owner_id, id).await
    }

    /// Shallow update under a row lock
    ///
    /// Concurrent updates of the same row queue on the lock instead of
    /// overwriting each other's merged state.
    pub async fn update(&self, owner_id: i64, id: i64, data: E::Update) -> Result<E, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let mut row = Repository::<E>::find_by_id_for_update(&mut tx, owner_id, id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        Self::ensure_task_owned(&mut tx, owner_id, E::update_task_ref(&data)).await?;

        row.merge(data);
        row.save(&mut tx).await?;

        tx.commit().await?;

        debug!(entity = E::schema().table, id = row.id(), owner_id, "Updated");
        self.get_by_id(owner_id, id).await
    }

    pub async fn delete(&self, owner_id: i64, id: i64) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;

        if Repository::<E>::find_by_id_for_update(&mut tx, owner_id, id)
            .await?
            .is_none()
        {
            return Err(Self::not_found(id));
        }

        Repository::<E>::delete(&mut tx, owner_id, id).await?;
        tx.commit().await?;

        info!(entity = E::schema().table, id, owner_id, "Deleted");
        Ok(())
    }
}

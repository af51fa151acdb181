/// Database models for TaskQuest
///
/// Each owned resource implements [`Entity`]: a static [`Schema`] describing
/// its table, plus the typed create/update payloads and the SQL that writes
/// them. The generic repository and service in the crate root are driven
/// entirely by this trait.
///
/// # Models
///
/// - `user`: accounts (not an [`Entity`]; managed by the auth flows)
/// - `auth_token`: one outstanding email token per address
/// - `task`: tasks worth a number of points
/// - `daily_to_do_list`: daily entries derived from a task
/// - `points_table`: rows crediting points for a task
/// - `progress_tracker`: per-user totals
///
/// # Example
///
/// ```no_run
/// use taskquest_shared::models::task::{CreateTask, Task};
/// use taskquest_shared::service::Service;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let tasks = Service::<Task>::new(pool);
/// let task = tasks
///     .create(1, CreateTask {
///         task_name: "Clean the kitchen".to_string(),
///         points: 10,
///         date_created: None,
///         date_updated: None,
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use serde::{de::{self, DeserializeOwned}, Deserialize, Deserializer, Serialize};
use sqlx::{postgres::PgRow, FromRow, PgConnection};
use validator::Validate;

pub mod auth_token;
pub mod daily_to_do_list;
pub mod points_table;
pub mod progress_tracker;
pub mod task;
pub mod user;

/// Maps an API field name onto its column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// camelCase name used in JSON and query parameters
    pub field: &'static str,

    /// snake_case column in the entity's table
    pub column: &'static str,
}

impl Column {
    pub const fn new(field: &'static str, column: &'static str) -> Self {
        Self { field, column }
    }
}

/// Static description of an owned table
///
/// Every table described here has `id`, `user_id`, `created_at` and
/// `updated_at` columns in addition to those listed in `columns`.
#[derive(Debug)]
pub struct Schema {
    /// Table name
    pub table: &'static str,

    /// Human-readable name used in error messages ("Task", "Daily to-do list")
    pub label: &'static str,

    /// Columns exposed through the API, including `id`
    pub columns: &'static [Column],

    /// Fields matched against the `search` keyword in listings
    pub searchable: &'static [&'static str],

    /// Fields returned by the dropdown query when the caller names none
    pub dropdown_defaults: &'static [&'static str],

    /// Whether rows reference a task through a nullable `task_id`
    pub task_relation: bool,
}

/// A requested field isn't part of an entity's schema
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown field '{field}' for {entity}")]
pub struct UnknownField {
    pub entity: &'static str,
    pub field: String,
}

impl Schema {
    /// Looks up a column by its API field name
    pub fn column(&'static self, field: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Resolves API field names against the whitelist, keeping request order
    /// and dropping duplicates
    pub fn resolve_fields<S: AsRef<str>>(
        &'static self,
        fields: &[S],
    ) -> Result<Vec<&'static Column>, UnknownField> {
        let mut resolved: Vec<&'static Column> = Vec::with_capacity(fields.len());

        for field in fields {
            let field = field.as_ref();
            let column = self.column(field).ok_or_else(|| UnknownField {
                entity: self.label,
                field: field.to_string(),
            })?;

            if !resolved.contains(&column) {
                resolved.push(column);
            }
        }

        Ok(resolved)
    }

    /// Columns matched by the listing keyword
    pub fn searchable_columns(&'static self) -> Vec<&'static Column> {
        self.searchable
            .iter()
            .filter_map(|field| self.column(field))
            .collect()
    }
}

/// The `{id, taskName}` projection of the parent task embedded in child rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub id: i64,
    pub task_name: String,
}

/// An owner-scoped resource handled by the generic repository and service
#[async_trait]
pub trait Entity:
    for<'r> FromRow<'r, PgRow> + Serialize + Send + Sync + Unpin + Sized + 'static
{
    /// Validated payload for `POST`
    type Create: DeserializeOwned + Validate + Send + 'static;

    /// Validated payload for `PUT`; absent fields leave stored values alone
    type Update: DeserializeOwned + Validate + Send + 'static;

    fn schema() -> &'static Schema;

    fn id(&self) -> i64;

    /// Task referenced by a create payload, checked for ownership before insert
    fn create_task_ref(_data: &Self::Create) -> Option<i64> {
        None
    }

    /// Task an update payload points the row at, checked for ownership
    fn update_task_ref(_data: &Self::Update) -> Option<i64> {
        None
    }

    /// Inserts a row owned by `owner_id`, returning its id
    async fn insert(
        conn: &mut PgConnection,
        owner_id: i64,
        data: Self::Create,
    ) -> Result<i64, sqlx::Error>;

    /// Shallow-merges an update payload into the loaded row
    fn merge(&mut self, data: Self::Update);

    /// Writes every mutable column of the row back
    async fn save(&self, conn: &mut PgConnection) -> Result<(), sqlx::Error>;
}

/// Deserializes a present field (including `null`) as `Some(..)`
///
/// Combined with `#[serde(default)]` this gives `Option<Option<T>>` fields
/// three states: absent (`None`), explicit null (`Some(None)`) and a value.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Deserializes an optional field whose column is `NOT NULL`
///
/// Absent stays `None` through `#[serde(default)]`; an explicit `null` is a
/// data error, so the update is rejected instead of silently ignored.
pub fn deserialize_non_null<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    match Option::<T>::deserialize(deserializer)? {
        Some(value) => Ok(Some(value)),
        None => Err(de::Error::custom("field cannot be null")),
    }
}

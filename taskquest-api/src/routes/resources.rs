/// Owner-scoped CRUD endpoints, generic over [`Entity`]
///
/// One set of handlers serves every resource; [`resource_router`] mounts
/// them for a concrete entity type. The caller id always comes from the
/// [`AuthContext`] the JWT layer inserted.
///
/// # Endpoints (per resource)
///
/// - `GET    /`          - Paged list (`page`, `limit`, `search`)
/// - `GET    /dropdown`  - At most five `{id, ..fields}` objects (`fields`, `keyword`)
/// - `GET    /:id`       - One row
/// - `POST   /`          - Create (201)
/// - `PUT    /:id`       - Partial update
/// - `DELETE /:id`       - Delete (204)

use crate::{app::AppState, error::ApiResult, extract::{PathParam, ValidatedJson}};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use taskquest_shared::{
    auth::middleware::AuthContext,
    models::Entity,
    query::{Page, Pagination},
    service::Service,
};

/// Query string of list endpoints
///
/// Kept as raw strings so bad numbers fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::from_query(self.page.as_deref(), self.limit.as_deref())
    }
}

/// Query string of dropdown endpoints
#[derive(Debug, Default, Deserialize)]
pub struct DropdownQuery {
    /// Comma-separated API field names
    pub fields: Option<String>,
    pub keyword: Option<String>,
}

impl DropdownQuery {
    /// Requested field names, trimmed, empty items dropped
    pub fn field_list(&self) -> Vec<&str> {
        self.fields
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .collect()
    }
}

/// Mounts the six CRUD routes for `E`
pub fn resource_router<E: Entity>() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<E>).post(create::<E>))
        .route("/dropdown", get(dropdown::<E>))
        .route("/:id", get(get_one::<E>).put(update::<E>).delete(delete::<E>))
}

pub async fn list<E: Entity>(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Page<E>>> {
    let page = Service::<E>::new(state.db.clone())
        .get_all(auth.user_id, query.pagination(), query.search.as_deref())
        .await?;

    Ok(Json(page))
}

/// Selection-list rows
///
/// # Errors
///
/// - `400 Bad Request`: a requested field isn't exposed by the resource
pub async fn dropdown<E: Entity>(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<DropdownQuery>,
) -> ApiResult<Json<Vec<serde_json::Value>>> {
    let rows = Service::<E>::new(state.db.clone())
        .dropdown(auth.user_id, &query.field_list(), query.keyword.as_deref())
        .await?;

    Ok(Json(rows))
}

pub async fn get_one<E: Entity>(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Json<E>> {
    let row = Service::<E>::new(state.db.clone())
        .get_by_id(auth.user_id, id)
        .await?;

    Ok(Json(row))
}

/// Creates a row owned by the caller
///
/// # Errors
///
/// - `400 Bad Request`: `taskId` isn't one of the caller's tasks
/// - `422 Unprocessable Entity`: payload failed validation
pub async fn create<E: Entity>(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(payload): ValidatedJson<E::Create>,
) -> ApiResult<(StatusCode, Json<E>)> {
    let row = Service::<E>::new(state.db.clone())
        .create(auth.user_id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// Merges the provided fields into the row
///
/// # Errors
///
/// - `400 Bad Request`: `taskId` isn't one of the caller's tasks
/// - `404 Not Found`: no such row for this caller
/// - `422 Unprocessable Entity`: payload failed validation
pub async fn update<E: Entity>(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    PathParam(id): PathParam<i64>,
    ValidatedJson(payload): ValidatedJson<E::Update>,
) -> ApiResult<Json<E>> {
    let row = Service::<E>::new(state.db.clone())
        .update(auth.user_id, id, payload)
        .await?;

    Ok(Json(row))
}

pub async fn delete<E: Entity>(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<StatusCode> {
    Service::<E>::new(state.db.clone())
        .delete(auth.user_id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

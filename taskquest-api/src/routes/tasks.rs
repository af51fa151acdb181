/// Listings scoped to one task
///
/// # Endpoints
///
/// - `GET /v1/tasks/:id/dailyToDoList` - Daily entries of the task
/// - `GET /v1/tasks/:id/pointsTable`   - Points rows of the task
///
/// Both take the same `page`/`limit`/`search` parameters as the plain list
/// endpoints and answer `404` when the task isn't the caller's.

use crate::{app::AppState, error::ApiResult, extract::PathParam, routes::resources::ListQuery};
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use taskquest_shared::{
    auth::middleware::AuthContext,
    models::{daily_to_do_list::DailyToDoList, points_table::PointsTable, task::Task, Entity},
    query::Page,
    service::Service,
};

use super::resources::resource_router;

/// Task CRUD plus the child listings
pub fn task_router() -> Router<AppState> {
    resource_router::<Task>()
        .route("/:id/dailyToDoList", get(children::<DailyToDoList>))
        .route("/:id/pointsTable", get(children::<PointsTable>))
}

pub async fn children<E: Entity>(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    PathParam(task_id): PathParam<i64>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Page<E>>> {
    let page = Service::<E>::new(state.db.clone())
        .get_by_task(
            auth.user_id,
            task_id,
            query.pagination(),
            query.search.as_deref(),
        )
        .await?;

    Ok(Json(page))
}

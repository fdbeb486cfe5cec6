/**
 * Category Handlers
 *
 * List/create/rename/delete for categories plus the category-scoped thread
 * listing and the SSE mirrors used by the sidebar.
 */

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::Event;
use axum::response::{IntoResponse, Sse};
use axum::Json;
use futures_util::Stream;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::models::{Category, CategoryPatch, Thread};
use crate::realtime::sse::snapshot_stream;
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ThreadListParams {
    pub limit: Option<usize>,
}

/// `GET /categories` - all categories, name ascending.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.categories.get_all().await?))
}

/// `POST /categories`
pub async fn create(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.categories.create(&body.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// `GET /categories/{id}` - the category, or 404 with a null body.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    match state.categories.get(&id).await? {
        Some(category) => Ok(Json(category).into_response()),
        None => Ok((StatusCode::NOT_FOUND, Json(serde_json::Value::Null)).into_response()),
    }
}

/// `PATCH /categories/{id}` - rename.
pub async fn update(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<CategoryPatch>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.categories.update(&id, patch).await?))
}

/// `DELETE /categories/{id}` - cascade delete of the category, its
/// threads, and their messages.
pub async fn delete(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.categories.delete_cascade(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /categories/{id}/threads?limit` - threads by recency of activity.
pub async fn threads(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ThreadListParams>,
) -> Result<Json<Vec<Thread>>, ApiError> {
    Ok(Json(state.threads.get_by_category(&id, params.limit).await?))
}

/// `GET /categories/subscribe` - SSE mirror of the full category list.
pub async fn subscribe(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    snapshot_stream(state.categories.subscribe_all())
}

/// `GET /categories/{id}/threads/subscribe` - SSE mirror of the category's
/// thread listing.
pub async fn subscribe_threads(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    snapshot_stream(state.threads.subscribe_by_category(&id))
}

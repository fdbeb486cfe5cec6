/**
 * Thread Handlers
 */

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateThreadRequest {
    pub name: String,
    pub category_id: String,
}

/// `POST /threads` - open a thread in a category; the caller becomes its
/// author.
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CreateThreadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let thread = state
        .threads
        .create(&body.name, &body.category_id, &user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(thread)))
}

/// `GET /threads/{id}` - the thread, or 404 with a null body.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    match state.threads.get(&id).await? {
        Some(thread) => Ok(Json(thread).into_response()),
        None => Ok((StatusCode::NOT_FOUND, Json(serde_json::Value::Null)).into_response()),
    }
}

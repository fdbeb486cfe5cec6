/**
 * Profile Handlers
 */

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::models::{ProfilePatch, UserProfile};
use crate::server::state::AppState;

/// `GET /users/{id}` - a public profile, or 404 with a null body.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    match state.profiles.get(&id).await? {
        Some(profile) => Ok(Json(profile).into_response()),
        None => Ok((StatusCode::NOT_FOUND, Json(serde_json::Value::Null)).into_response()),
    }
}

/// `PATCH /profile` - update the caller's own profile.
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.profiles.update(&user.id, patch).await?))
}

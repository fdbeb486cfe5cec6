/**
 * Current-User Handler
 */

use axum::extract::State;
use axum::Json;

use super::types::{MeResponse, SessionUser};
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::server::state::AppState;

/// `GET /me` - the session's account plus its profile, if one exists.
pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<MeResponse>, ApiError> {
    let profile = state.profiles.get(&user.id).await?;
    Ok(Json(MeResponse {
        user: SessionUser::from(&user),
        profile,
    }))
}

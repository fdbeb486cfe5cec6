/**
 * Dashboard Handler
 */

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::models::UserProfile;
use crate::server::state::AppState;
use crate::stats::UserStats;

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub profile: Option<UserProfile>,
    pub stats: UserStats,
}

/// `GET /` - the signed-in user's profile with their dashboard stats.
pub async fn home(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<HomeResponse>, ApiError> {
    let (profile, stats) = tokio::join!(state.profiles.get(&user.id), state.stats.for_user(&user.id));

    Ok(Json(HomeResponse {
        profile: profile?,
        stats,
    }))
}

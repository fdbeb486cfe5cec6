/**
 * Federated Login Handler
 */

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;

use super::types::{AuthResponse, SessionUser};
use super::session_cookie;
use crate::error::ApiError;
use crate::server::state::AppState;

/// `POST /google` - federated sign-in; a first login bootstraps the
/// profile from the provider's display info.
pub async fn google(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let (user, token) = state.bridge.sign_in_with_google().await?;

    let jar = jar.add(session_cookie(token, state.config.cookie_secure));
    Ok((
        jar,
        Json(AuthResponse {
            user: SessionUser::from(&user),
        }),
    ))
}

/**
 * Login Handler
 */

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;

use super::types::{AuthResponse, LoginRequest, SessionUser};
use super::session_cookie;
use crate::error::ApiError;
use crate::server::state::AppState;

/// `POST /login` - credential sign-in; sets the session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, token) = state.bridge.sign_in(&body.email, &body.password).await?;

    let jar = jar.add(session_cookie(token, state.config.cookie_secure));
    Ok((
        jar,
        Json(AuthResponse {
            user: SessionUser::from(&user),
        }),
    ))
}

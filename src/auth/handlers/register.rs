/**
 * Registration Handler
 */

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;

use super::types::{AuthResponse, RegisterRequest, SessionUser};
use super::session_cookie;
use crate::error::ApiError;
use crate::server::state::AppState;

/// `POST /register` - create account + profile, send the verification
/// mail, and establish the session.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, token) = state
        .bridge
        .register(&body.email, &body.password, &body.username)
        .await?;

    let jar = jar.add(session_cookie(token, state.config.cookie_secure));
    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            user: SessionUser::from(&user),
        }),
    ))
}

/**
 * Logout Handler
 */

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum_extra::extract::cookie::CookieJar;

use super::removal_cookie;
use crate::server::state::AppState;

/// `POST /logout` - clears the bridge state and replaces the session
/// cookie with an immediately expiring one.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    state.bridge.sign_out();
    (StatusCode::NO_CONTENT, jar.add(removal_cookie()))
}

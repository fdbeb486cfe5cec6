/**
 * Email Verification Handlers
 *
 * The verification page polls `GET /verify-email` until the account turns
 * verified; the emailed link lands on `GET /verify-email/confirm`. Both
 * re-issue the session token so the cookie's `email_verified` claim never
 * lags the account.
 */

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::session_cookie;
use super::types::VerifyStatusResponse;
use crate::error::{ApiError, AuthError};
use crate::middleware::CurrentUser;
use crate::server::state::AppState;

/// Suggested client poll interval while waiting for the confirm link.
const POLL_INTERVAL_SECONDS: u64 = 3;

#[derive(Debug, Deserialize)]
pub struct ConfirmParams {
    pub token: String,
}

/// `GET /verify-email` - fresh verification status; already-verified
/// accounts are sent home with a re-issued session.
pub async fn status(
    State(state): State<AppState>,
    jar: CookieJar,
    user: CurrentUser,
) -> Result<Response, ApiError> {
    let (fresh, token) = state
        .bridge
        .refresh(&user.id)
        .await?
        .ok_or(ApiError::Auth(AuthError::InvalidSession))?;

    let jar = jar.add(session_cookie(token, state.config.cookie_secure));
    if fresh.email_verified {
        return Ok((jar, Redirect::to("/")).into_response());
    }

    Ok((
        jar,
        Json(VerifyStatusResponse {
            email: fresh.email,
            email_verified: false,
            poll_interval_seconds: POLL_INTERVAL_SECONDS,
        }),
    )
        .into_response())
}

/// `POST /verify-email/send` - resend the confirm link; no-op when the
/// account is already verified.
pub async fn send(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<StatusCode, ApiError> {
    state.bridge.send_verification_email(&user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /verify-email/confirm?token=` - redeem the emailed token. Works
/// with or without an existing session; on success the session cookie is
/// (re)issued with the verified claim and the browser is sent home.
pub async fn confirm(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<ConfirmParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, token) = state.bridge.confirm_verification(&params.token).await?;
    tracing::info!("verification confirmed for {}", user.id);

    let jar = jar.add(session_cookie(token, state.config.cookie_secure));
    Ok((jar, Redirect::to("/")))
}

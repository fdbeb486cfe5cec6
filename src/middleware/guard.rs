/**
 * Session Route Guard
 *
 * One enforcement path for every page route: the middleware reads the
 * `__session` cookie, verifies the token with the identity port (a forged
 * or stale cookie counts as absent), and routes the request through the
 * pure `decide` function. Valid claims land in request extensions as
 * `CurrentUser` so handlers never re-verify.
 *
 * Static assets and `/health` are mounted outside the guarded layer.
 */

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::SESSION_COOKIE;
use crate::error::{ApiError, AuthError};
use crate::server::state::AppState;

/// Routes reachable only without a session.
const PUBLIC_ROUTES: [&str; 2] = ["/login", "/register"];

/// Routes reachable without a session (the confirm link in the email may be
/// opened from a browser with no cookie).
const AUTH_ROUTES: [&str; 3] = ["/login", "/register", "/verify-email"];

/// What the guard decided for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectTo(&'static str),
}

/// Prefix match on path segments: `/verify-email/confirm` is under
/// `/verify-email`, but `/verify-emailx` is not.
fn path_under(path: &str, route: &str) -> bool {
    path == route
        || path
            .strip_prefix(route)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// The guard's decision table.
pub fn decide(has_session: bool, path: &str) -> Decision {
    let in_auth_routes = AUTH_ROUTES.iter().any(|route| path_under(path, route));
    let in_public_routes = PUBLIC_ROUTES.iter().any(|route| path_under(path, route));

    if !has_session && !in_auth_routes {
        return Decision::RedirectTo("/login");
    }
    if has_session && in_public_routes {
        return Decision::RedirectTo("/");
    }
    Decision::Allow
}

/// Verified session claims for the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub email_verified: bool,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(ApiError::Auth(AuthError::InvalidSession))
    }
}

/// A `CurrentUser` whose email is verified; unverified callers are sent to
/// the verification page.
#[derive(Debug, Clone)]
pub struct VerifiedUser(pub CurrentUser);

impl<S> FromRequestParts<S> for VerifiedUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        if !user.email_verified {
            return Err(Redirect::temporary("/verify-email").into_response());
        }
        Ok(Self(user))
    }
}

/// The guard middleware itself.
pub async fn session_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.identity.verify_session(cookie.value()).ok());

    let path = request.uri().path().to_string();
    match decide(claims.is_some(), &path) {
        Decision::RedirectTo(target) => {
            tracing::debug!("guard redirect {} -> {}", path, target);
            Redirect::temporary(target).into_response()
        }
        Decision::Allow => {
            if let Some(claims) = claims {
                request.extensions_mut().insert(CurrentUser {
                    id: claims.sub,
                    email: claims.email,
                    email_verified: claims.email_verified,
                });
            }
            next.run(request).await
        }
    }
}

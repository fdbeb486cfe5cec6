/**
 * Auth Handlers
 *
 * HTTP surface of the auth flows: register, login, federated login,
 * logout, the current-user endpoint, and the email-verification pages.
 *
 * Every handler that establishes a session mirrors the bearer token into
 * the `__session` cookie; logout replaces it with an immediately expiring
 * removal cookie so no stale cookie is left behind.
 */

pub mod google;
pub mod login;
pub mod logout;
pub mod me;
pub mod register;
pub mod types;
pub mod verify;

use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::auth::sessions::SESSION_TTL_SECS;
use crate::auth::SESSION_COOKIE;

/// Build the session cookie. Max-Age matches the token TTL so the cookie
/// and the token expire together.
pub(crate) fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_secure(secure);
    cookie.set_max_age(time::Duration::seconds(SESSION_TTL_SECS as i64));
    cookie
}

/// Cookie that overwrites `__session` and expires immediately.
pub(crate) fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_max_age(time::Duration::ZERO);
    cookie
}

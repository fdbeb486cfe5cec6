/**
 * Authentication
 *
 * Everything identity: the `IdentityProvider` port, the local
 * bcrypt/JWT-backed adapter, the verification mailer, the auth/session
 * bridge with its status state machine, and the HTTP handlers for the
 * login/register/verify flows.
 *
 * The session cookie carries the provider-issued bearer token; the route
 * guard (see `middleware`) verifies it on every request.
 */

pub mod bridge;
pub mod handlers;
pub mod identity;
pub mod mailer;
pub mod provider;
pub mod sessions;

pub use bridge::{AuthBridge, SessionState, SessionStatus};
pub use identity::LocalIdentity;
pub use mailer::{LogMailer, SmtpMailer, VerificationMailer};
pub use provider::{AuthUser, FederatedUser, IdentityProvider};

/// Name of the session cookie read by the route guard.
pub const SESSION_COOKIE: &str = "__session";

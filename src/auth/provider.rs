/**
 * Identity Provider Port
 *
 * The external identity provider is a black box consumed through this
 * trait: credential sign-in/sign-up, a federated popup flow, user lookup,
 * verification-email issue/confirm, and session token issue/verify.
 *
 * `LocalIdentity` implements it for self-hosted deployments; tests swap in
 * doubles for the flows a local adapter cannot exercise (the federated
 * popup).
 */

use async_trait::async_trait;

use crate::auth::sessions::Claims;
use crate::error::AuthError;

/// An authenticated account as the provider reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Provider-assigned user id (profiles reuse it as their id)
    pub id: String,
    pub email: String,
    pub email_verified: bool,
}

/// Result of a federated sign-in, carrying the provider's display info for
/// the lazy profile bootstrap.
#[derive(Debug, Clone)]
pub struct FederatedUser {
    pub user: AuthUser,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    /// First-ever login for this identity
    pub is_new: bool,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify credentials. `AuthError::InvalidCredentials` on mismatch,
    /// with no distinction between unknown email and wrong password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Create an account. Fails with `EmailInUse`, `WeakPassword`, or
    /// `InvalidEmail`; new accounts start unverified.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Run the federated (Google) popup flow.
    async fn federated_sign_in(&self) -> Result<FederatedUser, AuthError>;

    /// Fresh account state, `None` when the id is unknown.
    async fn lookup(&self, user_id: &str) -> Result<Option<AuthUser>, AuthError>;

    /// Issue (or re-issue) a verification token and mail the confirm link.
    async fn send_verification(&self, user_id: &str) -> Result<(), AuthError>;

    /// Redeem an emailed verification token, marking the account verified.
    async fn confirm_verification(&self, token: &str) -> Result<AuthUser, AuthError>;

    /// Mint the bearer token mirrored into the session cookie.
    fn issue_session(&self, user: &AuthUser) -> Result<String, AuthError>;

    /// Verify a presented session token; forged or expired tokens fail with
    /// `InvalidSession`.
    fn verify_session(&self, token: &str) -> Result<Claims, AuthError>;
}

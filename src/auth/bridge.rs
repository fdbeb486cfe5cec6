/**
 * Auth/Session Bridge
 *
 * Orchestrates the identity port for the HTTP layer: credential and
 * federated sign-in, registration with the matching profile bootstrap,
 * verification mail, and the session-state watch stream.
 *
 * The bridge is an explicit dependency held in `AppState`; requests derive
 * their own session from the cookie, while the watch stream mirrors the
 * latest auth-state change for in-process observers.
 */

use std::sync::Arc;

use tokio::sync::watch;

use crate::auth::provider::{AuthUser, FederatedUser, IdentityProvider};
use crate::error::{ApiError, ValidationError};
use crate::profiles::service::{is_valid_username, ProfileService};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Anonymous,
    Authenticating,
    AuthenticatedUnverified,
    AuthenticatedVerified,
    Error,
}

/// Snapshot published on every auth-state change.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub status: SessionStatus,
    pub user: Option<AuthUser>,
    /// Session token mirrored into the `__session` cookie.
    pub token: Option<String>,
}

impl SessionState {
    fn anonymous() -> Self {
        Self {
            status: SessionStatus::Anonymous,
            user: None,
            token: None,
        }
    }

    fn authenticated(user: AuthUser, token: String) -> Self {
        let status = if user.email_verified {
            SessionStatus::AuthenticatedVerified
        } else {
            SessionStatus::AuthenticatedUnverified
        };
        Self {
            status,
            user: Some(user),
            token: Some(token),
        }
    }
}

pub struct AuthBridge {
    identity: Arc<dyn IdentityProvider>,
    profiles: ProfileService,
    state: watch::Sender<SessionState>,
}

impl AuthBridge {
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: ProfileService) -> Self {
        let (state, _) = watch::channel(SessionState::anonymous());
        Self {
            identity,
            profiles,
            state,
        }
    }

    /// Watch stream of session-state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn current_state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    fn publish(&self, state: SessionState) {
        self.state.send_replace(state);
    }

    fn publish_error(&self) {
        self.state.send_replace(SessionState {
            status: SessionStatus::Error,
            user: None,
            token: None,
        });
    }

    /// Credential sign-in. Returns the user and the session token that the
    /// HTTP layer mirrors into the cookie.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(AuthUser, String), ApiError> {
        self.publish(SessionState {
            status: SessionStatus::Authenticating,
            user: None,
            token: None,
        });

        let user = match self.identity.sign_in(email, password).await {
            Ok(user) => user,
            Err(e) => {
                self.publish(SessionState::anonymous());
                return Err(e.into());
            }
        };
        let token = self.identity.issue_session(&user)?;

        tracing::info!("signed in {}", user.id);
        self.publish(SessionState::authenticated(user.clone(), token.clone()));
        Ok((user, token))
    }

    /// Federated sign-in. A first-ever login lazily bootstraps the profile
    /// from the provider's display info.
    pub async fn sign_in_with_google(&self) -> Result<(AuthUser, String), ApiError> {
        self.publish(SessionState {
            status: SessionStatus::Authenticating,
            user: None,
            token: None,
        });

        let federated = match self.identity.federated_sign_in().await {
            Ok(federated) => federated,
            Err(e) => {
                self.publish(SessionState::anonymous());
                return Err(e.into());
            }
        };

        if federated.is_new || self.profiles.get(&federated.user.id).await?.is_none() {
            self.bootstrap_profile(&federated).await?;
        }

        let user = federated.user;
        let token = self.identity.issue_session(&user)?;

        tracing::info!("federated sign-in for {}", user.id);
        self.publish(SessionState::authenticated(user.clone(), token.clone()));
        Ok((user, token))
    }

    /// Register a new account and its profile, then send the verification
    /// mail. A mail failure does not fail registration.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<(AuthUser, String), ApiError> {
        let username = username.trim();
        if !is_valid_username(username) {
            return Err(ValidationError::new(
                "username",
                "must be 3-30 characters, start with a letter, and contain only letters, numbers, and underscores",
            )
            .into());
        }

        let user = self.identity.sign_up(email, password).await?;
        self.profiles.create(&user.id, username, None).await?;

        if let Err(e) = self.identity.send_verification(&user.id).await {
            tracing::warn!("verification mail for {} failed: {}", user.email, e);
        }

        let token = self.identity.issue_session(&user)?;
        tracing::info!("registered {} ({})", username, user.id);
        self.publish(SessionState::authenticated(user.clone(), token.clone()));
        Ok((user, token))
    }

    /// Resend the verification link. No-op when already verified.
    pub async fn send_verification_email(&self, user_id: &str) -> Result<(), ApiError> {
        Ok(self.identity.send_verification(user_id).await?)
    }

    /// Redeem an emailed verification token and re-issue the session with
    /// the verified flag set.
    pub async fn confirm_verification(&self, token: &str) -> Result<(AuthUser, String), ApiError> {
        let user = self.identity.confirm_verification(token).await?;
        let session = self.identity.issue_session(&user)?;
        self.publish(SessionState::authenticated(user.clone(), session.clone()));
        Ok((user, session))
    }

    /// Reload the user from the provider and re-issue the session token;
    /// an unknown id clears the state.
    pub async fn refresh(&self, user_id: &str) -> Result<Option<(AuthUser, String)>, ApiError> {
        match self.identity.lookup(user_id).await {
            Ok(Some(user)) => {
                let token = self.identity.issue_session(&user)?;
                self.publish(SessionState::authenticated(user.clone(), token.clone()));
                Ok(Some((user, token)))
            }
            Ok(None) => {
                self.publish(SessionState::anonymous());
                Ok(None)
            }
            Err(e) => {
                self.publish_error();
                Err(e.into())
            }
        }
    }

    /// Username fallback chain: display name, then the email local-part,
    /// then "Anonymous".
    async fn bootstrap_profile(&self, federated: &FederatedUser) -> Result<(), ApiError> {
        let fallback = federated
            .user
            .email
            .split('@')
            .next()
            .filter(|part| !part.is_empty())
            .unwrap_or("Anonymous");
        let username = federated
            .display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(fallback);

        self.profiles
            .create(&federated.user.id, username, federated.avatar_url.clone())
            .await?;
        Ok(())
    }

    /// Clear the bridge state. The HTTP layer clears the cookie.
    pub fn sign_out(&self) {
        self.publish(SessionState::anonymous());
        tracing::debug!("session cleared");
    }

    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity
    }
}

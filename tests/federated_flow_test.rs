/**
 * Federated Sign-In Tests
 *
 * Drives the auth bridge through a stub identity provider to cover the
 * first-login profile bootstrap and its username fallback chain: provider
 * display name, then the email local-part, then "Anonymous".
 */

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use palaver::auth::sessions::Claims;
use palaver::auth::{AuthBridge, AuthUser, FederatedUser, IdentityProvider, SessionStatus};
use palaver::error::AuthError;
use palaver::profiles::ProfileService;
use palaver::store::{DocumentStore, MemoryStore};

/// Provider whose federated flow always yields the configured user.
struct StubProvider {
    federated: FederatedUser,
}

#[async_trait]
impl IdentityProvider for StubProvider {
    async fn sign_in(&self, _email: &str, _password: &str) -> Result<AuthUser, AuthError> {
        Err(AuthError::InvalidCredentials)
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> Result<AuthUser, AuthError> {
        Err(AuthError::Provider("credential sign-up unsupported".to_string()))
    }

    async fn federated_sign_in(&self) -> Result<FederatedUser, AuthError> {
        Ok(self.federated.clone())
    }

    async fn lookup(&self, user_id: &str) -> Result<Option<AuthUser>, AuthError> {
        if user_id == self.federated.user.id {
            Ok(Some(self.federated.user.clone()))
        } else {
            Ok(None)
        }
    }

    async fn send_verification(&self, _user_id: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn confirm_verification(&self, _token: &str) -> Result<AuthUser, AuthError> {
        Err(AuthError::InvalidSession)
    }

    fn issue_session(&self, user: &AuthUser) -> Result<String, AuthError> {
        Ok(format!("stub-token-{}", user.id))
    }

    fn verify_session(&self, _token: &str) -> Result<Claims, AuthError> {
        Err(AuthError::InvalidSession)
    }
}

fn bridge_with(federated: FederatedUser) -> (AuthBridge, ProfileService) {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let profiles = ProfileService::new(store);
    let bridge = AuthBridge::new(Arc::new(StubProvider { federated }), profiles.clone());
    (bridge, profiles)
}

fn federated_user(display_name: Option<&str>, email: &str) -> FederatedUser {
    FederatedUser {
        user: AuthUser {
            id: "google-1".to_string(),
            email: email.to_string(),
            email_verified: true,
        },
        display_name: display_name.map(str::to_string),
        avatar_url: Some("https://avatars.test/google-1.png".to_string()),
        is_new: true,
    }
}

#[tokio::test]
async fn test_first_login_bootstraps_profile_from_display_name() {
    let (bridge, profiles) = bridge_with(federated_user(Some("Dana Scully"), "ds@example.com"));

    let (user, token) = bridge.sign_in_with_google().await.unwrap();
    assert_eq!(user.id, "google-1");
    assert_eq!(token, "stub-token-google-1");
    assert_eq!(
        bridge.current_state().status,
        SessionStatus::AuthenticatedVerified
    );

    let profile = profiles.get("google-1").await.unwrap().unwrap();
    assert_eq!(profile.username, "Dana Scully");
    assert_eq!(
        profile.avatar_url.as_deref(),
        Some("https://avatars.test/google-1.png")
    );
}

#[tokio::test]
async fn test_bootstrap_falls_back_to_email_local_part() {
    let (bridge, profiles) = bridge_with(federated_user(None, "ds@example.com"));

    bridge.sign_in_with_google().await.unwrap();

    let profile = profiles.get("google-1").await.unwrap().unwrap();
    assert_eq!(profile.username, "ds");
}

#[tokio::test]
async fn test_bootstrap_falls_back_to_anonymous() {
    // Blank display name and an email with no local part exhaust the chain.
    let (bridge, profiles) = bridge_with(federated_user(Some("   "), "@example.com"));

    bridge.sign_in_with_google().await.unwrap();

    let profile = profiles.get("google-1").await.unwrap().unwrap();
    assert_eq!(profile.username, "Anonymous");
}

#[tokio::test]
async fn test_returning_login_keeps_existing_profile() {
    let mut federated = federated_user(Some("Dana Scully"), "ds@example.com");
    federated.is_new = false;
    let (bridge, profiles) = bridge_with(federated);

    profiles.create("google-1", "dscully", None).await.unwrap();
    bridge.sign_in_with_google().await.unwrap();

    let profile = profiles.get("google-1").await.unwrap().unwrap();
    assert_eq!(profile.username, "dscully");
}

/**
 * Local Identity Adapter
 *
 * `IdentityProvider` implementation for self-hosted deployments: account
 * records live in the reserved `identities` collection of the document
 * store, passwords are bcrypt hashes, sessions are HS256 JWTs, and
 * email-verification tokens are redeemed through the confirm endpoint's
 * emailed link.
 *
 * Federated sign-in is not configured locally and always fails with a
 * provider error; the bridge logic around it is exercised through test
 * doubles.
 */

use std::sync::Arc;

use async_trait::async_trait;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::provider::{AuthUser, FederatedUser, IdentityProvider};
use crate::auth::sessions::{self, Claims};
use crate::error::AuthError;
use crate::models::Entity;
use crate::store::{Collection, DocumentStore, Query};

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;

/// Account record persisted in the `identities` collection. Never leaves
/// this module; the rest of the system sees `AuthUser`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccountRecord {
    id: String,
    email: String,
    password_hash: String,
    email_verified: bool,
    verification_token: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    updated_at: DateTime<Utc>,
}

impl Entity for AccountRecord {
    const COLLECTION: &'static str = "identities";

    fn id(&self) -> &str {
        &self.id
    }
}

impl From<&AccountRecord> for AuthUser {
    fn from(account: &AccountRecord) -> Self {
        AuthUser {
            id: account.id.clone(),
            email: account.email.clone(),
            email_verified: account.email_verified,
        }
    }
}

pub struct LocalIdentity {
    accounts: Collection<AccountRecord>,
    mailer: Arc<dyn crate::auth::mailer::VerificationMailer>,
    session_secret: String,
    public_base_url: String,
}

impl LocalIdentity {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        mailer: Arc<dyn crate::auth::mailer::VerificationMailer>,
        session_secret: String,
        public_base_url: String,
    ) -> Self {
        Self {
            accounts: Collection::new(store),
            mailer,
            session_secret,
            public_base_url,
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, AuthError> {
        let mut matches = self
            .accounts
            .list(Query::new().filter("email", email).limit(1))
            .await
            .map_err(|e| AuthError::Unknown(e.to_string()))?;
        Ok(matches.pop())
    }

    fn confirm_link(&self, token: &str) -> String {
        format!(
            "{}/verify-email/confirm?token={}",
            self.public_base_url.trim_end_matches('/'),
            token
        )
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let account = self
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let valid = verify(password, &account.password_hash)
            .map_err(|e| AuthError::Unknown(e.to_string()))?;
        if !valid {
            tracing::warn!("invalid password for {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        Ok(AuthUser::from(&account))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        if !email.contains('@') {
            return Err(AuthError::InvalidEmail);
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }
        if self.find_by_email(email).await?.is_some() {
            tracing::warn!("email already registered: {}", email);
            return Err(AuthError::EmailInUse);
        }

        let password_hash =
            hash(password, DEFAULT_COST).map_err(|e| AuthError::Unknown(e.to_string()))?;

        let now = Utc::now();
        let account = AccountRecord {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash,
            email_verified: false,
            verification_token: None,
            created_at: now,
            updated_at: now,
        };
        self.accounts
            .put(&account)
            .await
            .map_err(|e| AuthError::Unknown(e.to_string()))?;

        tracing::info!("created identity {} for {}", account.id, account.email);
        Ok(AuthUser::from(&account))
    }

    async fn federated_sign_in(&self) -> Result<FederatedUser, AuthError> {
        Err(AuthError::Provider(
            "federated sign-in is not configured for this deployment".to_string(),
        ))
    }

    async fn lookup(&self, user_id: &str) -> Result<Option<AuthUser>, AuthError> {
        let account = self
            .accounts
            .get(user_id)
            .await
            .map_err(|e| AuthError::Unknown(e.to_string()))?;
        Ok(account.as_ref().map(AuthUser::from))
    }

    async fn send_verification(&self, user_id: &str) -> Result<(), AuthError> {
        let account = self
            .accounts
            .get(user_id)
            .await
            .map_err(|e| AuthError::Unknown(e.to_string()))?
            .ok_or(AuthError::InvalidSession)?;

        if account.email_verified {
            return Ok(());
        }

        let token = uuid::Uuid::new_v4().to_string();
        self.accounts
            .update(
                user_id,
                json!({
                    "verification_token": token,
                    "updated_at": Utc::now().timestamp_millis(),
                }),
            )
            .await
            .map_err(|e| AuthError::Unknown(e.to_string()))?;

        self.mailer
            .send(&account.email, &self.confirm_link(&token))
            .await
    }

    async fn confirm_verification(&self, token: &str) -> Result<AuthUser, AuthError> {
        let mut matches = self
            .accounts
            .list(Query::new().filter("verification_token", token).limit(1))
            .await
            .map_err(|e| AuthError::Unknown(e.to_string()))?;
        let account = matches.pop().ok_or(AuthError::InvalidSession)?;

        let confirmed = self
            .accounts
            .update(
                &account.id,
                json!({
                    "email_verified": true,
                    "verification_token": Value::Null,
                    "updated_at": Utc::now().timestamp_millis(),
                }),
            )
            .await
            .map_err(|e| AuthError::Unknown(e.to_string()))?;

        tracing::info!("email verified for {}", confirmed.email);
        Ok(AuthUser::from(&confirmed))
    }

    fn issue_session(&self, user: &AuthUser) -> Result<String, AuthError> {
        sessions::create_token(user, &self.session_secret)
    }

    fn verify_session(&self, token: &str) -> Result<Claims, AuthError> {
        sessions::verify_token(token, &self.session_secret)
    }
}

/**
 * Auth Request/Response Types
 */

use serde::{Deserialize, Serialize};

use crate::auth::provider::AuthUser;
use crate::middleware::CurrentUser;
use crate::models::UserProfile;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The account as returned to the client; never includes tokens or hashes.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub email_verified: bool,
}

impl From<&AuthUser> for SessionUser {
    fn from(user: &AuthUser) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            email_verified: user.email_verified,
        }
    }
}

impl From<&CurrentUser> for SessionUser {
    fn from(user: &CurrentUser) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            email_verified: user.email_verified,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: SessionUser,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: SessionUser,
    pub profile: Option<UserProfile>,
}

/// Verification page payload; the client polls at the suggested interval.
#[derive(Debug, Serialize)]
pub struct VerifyStatusResponse {
    pub email: String,
    pub email_verified: bool,
    pub poll_interval_seconds: u64,
}

/**
 * Session Tokens
 *
 * JWT creation and validation for user sessions. The token doubles as the
 * session cookie value; its TTL and the cookie's Max-Age are the same
 * constant so neither can outlive the other.
 */

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::auth::provider::AuthUser;
use crate::error::AuthError;

/// Sessions live for 14 days.
pub const SESSION_TTL_SECS: u64 = 14 * 24 * 60 * 60;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Email
    pub email: String,
    /// Whether the email was verified when the token was issued
    pub email_verified: bool,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Create a session JWT for a user.
pub fn create_token(user: &AuthUser, secret: &str) -> Result<String, AuthError> {
    let now = unix_now();
    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        email_verified: user.email_verified,
        iat: now,
        exp: now + SESSION_TTL_SECS,
    };

    let key = EncodingKey::from_secret(secret.as_ref());
    encode(&Header::default(), &claims, &key).map_err(|e| AuthError::Unknown(e.to_string()))
}

/// Verify and decode a session JWT. Any failure (bad signature, expiry,
/// malformed token) collapses to `InvalidSession`.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(secret.as_ref());
    let validation = Validation::default();

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidSession)
}

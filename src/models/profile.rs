/**
 * User Profile Model
 *
 * Display identity (username, avatar, bio) layered over the identity
 * provider's account. The profile id always equals the provider's user id,
 * and the record is created lazily on first registration or federated login.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Entity;

/// A user's public display identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    /// Equals the identity provider's user id
    pub id: String,
    /// Display name
    pub username: String,
    /// Avatar image URL, if any
    pub avatar_url: Option<String>,
    /// Free-form bio
    pub bio: Option<String>,
    /// Created at timestamp
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for UserProfile {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Mutable fields of a profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

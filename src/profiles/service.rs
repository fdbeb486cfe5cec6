/**
 * Profile Service
 *
 * CRUD for user profiles. Unlike the other entities, a profile's id is
 * supplied by the caller: it must equal the identity provider's user id, so
 * writes go through `put` rather than a store-assigned insert.
 *
 * `get_many` batch-fetches the profiles for a set of author ids so a
 * message list renders with one lookup instead of one per distinct author.
 */

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::error::{ApiError, PersistenceError, ValidationError};
use crate::models::{advance_stamp, Entity, ProfilePatch, UserProfile};
use crate::realtime::{subscription, Subscription};
use crate::store::{Collection, DocumentStore, Query};

/// Usernames are 3-30 characters, start with a letter, and contain only
/// letters, digits, and underscores.
pub fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 30 {
        return false;
    }

    let mut chars = username.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Clone)]
pub struct ProfileService {
    profiles: Collection<UserProfile>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            profiles: Collection::new(store),
        }
    }

    /// Create a profile under the identity provider's user id.
    pub async fn create(
        &self,
        id: &str,
        username: &str,
        avatar_url: Option<String>,
    ) -> Result<UserProfile, ApiError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ValidationError::empty("username").into());
        }

        let now = Utc::now();
        let profile = UserProfile {
            id: id.to_string(),
            username: username.to_string(),
            avatar_url,
            bio: None,
            created_at: now,
            updated_at: now,
        };
        self.profiles.put(&profile).await?;

        tracing::info!("created profile {} ({})", profile.username, profile.id);
        // Round-trip through the store so timestamps carry store precision.
        Ok(self.profiles.get(id).await?.unwrap_or(profile))
    }

    pub async fn get(&self, id: &str) -> Result<Option<UserProfile>, ApiError> {
        Ok(self.profiles.get(id).await?)
    }

    /// Batch fetch. Duplicate ids are collapsed; absent ids are skipped.
    pub async fn get_many(&self, ids: &[String]) -> Result<Vec<UserProfile>, ApiError> {
        let unique: Vec<String> = ids
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Ok(self.profiles.get_many(&unique).await?)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<UserProfile>, ApiError> {
        let mut matches = self
            .profiles
            .list(Query::new().filter("username", username).limit(1))
            .await?;
        Ok(matches.pop())
    }

    pub async fn update(&self, id: &str, patch: ProfilePatch) -> Result<UserProfile, ApiError> {
        let current = self
            .profiles
            .get(id)
            .await?
            .ok_or_else(|| PersistenceError::not_found(UserProfile::COLLECTION, id))?;

        let mut fields = serde_json::Map::new();
        if let Some(username) = patch.username {
            let username = username.trim().to_string();
            if !is_valid_username(&username) {
                return Err(ValidationError::new(
                    "username",
                    "must be 3-30 characters, start with a letter, and contain only letters, numbers, and underscores",
                )
                .into());
            }
            fields.insert("username".to_string(), Value::String(username));
        }
        if let Some(avatar_url) = patch.avatar_url {
            fields.insert("avatar_url".to_string(), Value::String(avatar_url));
        }
        if let Some(bio) = patch.bio {
            fields.insert("bio".to_string(), Value::String(bio));
        }
        fields.insert(
            "updated_at".to_string(),
            advance_stamp(current.updated_at).into(),
        );

        Ok(self.profiles.update(id, Value::Object(fields)).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        Ok(self.profiles.delete(id).await?)
    }

    /// Live mirror of `get(id)`.
    pub fn subscribe(&self, id: &str) -> Subscription<Option<UserProfile>> {
        let events = self.profiles.watch();
        let profiles = self.profiles.clone();
        let id = id.to_string();
        subscription::spawn(events, move || {
            let profiles = profiles.clone();
            let id = id.clone();
            async move { profiles.get(&id).await }
        })
    }
}

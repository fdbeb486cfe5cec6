/**
 * Thread Service
 *
 * CRUD, listing, and live subscription for threads. Category listings are
 * ordered by `last_message_at` descending (most recently active first) and
 * default to a page of 20; author listings are unlimited.
 *
 * `category_id` is advisory: creating a thread does not verify the category
 * exists, and a thread whose category was deleted simply stops appearing in
 * category listings.
 */

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};

use crate::error::{ApiError, PersistenceError, ValidationError};
use crate::models::{advance_stamp, Entity, Thread, ThreadPatch};
use crate::realtime::{subscription, Subscription};
use crate::store::{Collection, Direction, DocumentStore, Query};

/// Default page size for `get_by_category`.
pub const DEFAULT_CATEGORY_PAGE: usize = 20;

#[derive(Clone)]
pub struct ThreadService {
    threads: Collection<Thread>,
}

impl ThreadService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            threads: Collection::new(store),
        }
    }

    /// Create a thread. `last_message_at` starts equal to `created_at`, so
    /// the invariant `last_message_at >= created_at` holds from birth.
    pub async fn create(
        &self,
        name: &str,
        category_id: &str,
        author_id: &str,
    ) -> Result<Thread, ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::empty("name").into());
        }
        if category_id.is_empty() {
            return Err(ValidationError::empty("category_id").into());
        }

        let now = Utc::now().timestamp_millis();
        let thread = self
            .threads
            .insert(json!({
                "name": name,
                "category_id": category_id,
                "author_id": author_id,
                "created_at": now,
                "updated_at": now,
                "last_message_at": now,
            }))
            .await?;

        tracing::info!(
            "created thread {} in category {}",
            thread.id,
            thread.category_id
        );
        Ok(thread)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Thread>, ApiError> {
        Ok(self.threads.get(id).await?)
    }

    /// Threads in a category, most recently active first.
    pub async fn get_by_category(
        &self,
        category_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Thread>, ApiError> {
        Ok(self
            .threads
            .list(
                Query::new()
                    .filter("category_id", category_id)
                    .order_by("last_message_at", Direction::Desc)
                    .limit(limit.unwrap_or(DEFAULT_CATEGORY_PAGE)),
            )
            .await?)
    }

    /// All threads a user has authored, most recently active first.
    pub async fn get_by_author(&self, author_id: &str) -> Result<Vec<Thread>, ApiError> {
        Ok(self
            .threads
            .list(
                Query::new()
                    .filter("author_id", author_id)
                    .order_by("last_message_at", Direction::Desc),
            )
            .await?)
    }

    /// Rename a thread. The foreign keys are immutable by construction of
    /// the typed patch.
    pub async fn update(&self, id: &str, patch: ThreadPatch) -> Result<Thread, ApiError> {
        let current = self
            .threads
            .get(id)
            .await?
            .ok_or_else(|| PersistenceError::not_found(Thread::COLLECTION, id))?;

        let mut fields = serde_json::Map::new();
        if let Some(name) = patch.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ValidationError::empty("name").into());
            }
            fields.insert("name".to_string(), Value::String(name));
        }
        fields.insert(
            "updated_at".to_string(),
            advance_stamp(current.updated_at).into(),
        );

        Ok(self.threads.update(id, Value::Object(fields)).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        Ok(self.threads.delete(id).await?)
    }

    /// Stamp `last_message_at = updated_at = now`. Message posting goes
    /// through `MessageService::post`, which performs this bump atomically
    /// with the message write; this standalone variant exists for callers
    /// coordinating their own writes.
    pub async fn update_last_message_time(&self, id: &str) -> Result<Thread, ApiError> {
        let current = self
            .threads
            .get(id)
            .await?
            .ok_or_else(|| PersistenceError::not_found(Thread::COLLECTION, id))?;

        let now = advance_stamp(current.updated_at);
        Ok(self
            .threads
            .update(id, json!({"last_message_at": now, "updated_at": now}))
            .await?)
    }

    /// Live mirror of `get_by_category` with the default page size.
    pub fn subscribe_by_category(&self, category_id: &str) -> Subscription<Vec<Thread>> {
        let events = self.threads.watch();
        let threads = self.threads.clone();
        let category_id = category_id.to_string();
        subscription::spawn(events, move || {
            let threads = threads.clone();
            let category_id = category_id.clone();
            async move {
                threads
                    .list(
                        Query::new()
                            .filter("category_id", category_id)
                            .order_by("last_message_at", Direction::Desc)
                            .limit(DEFAULT_CATEGORY_PAGE),
                    )
                    .await
            }
        })
    }
}

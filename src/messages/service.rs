/**
 * Message Service
 *
 * CRUD, listing, and live subscription for messages.
 *
 * Listings come back newest-first (`created_at` descending); callers that
 * need chronological display re-sort ascending on their side, which matches
 * the store's native paging direction.
 *
 * Posting is atomic: `post` writes the message and bumps the owning
 * thread's `last_message_at`/`updated_at` in one write batch with a single
 * clock read, so there is no window in which the message exists while the
 * thread still looks idle.
 */

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};

use crate::error::{ApiError, PersistenceError, ValidationError};
use crate::models::{advance_stamp, Entity, Message, MessagePatch, Thread};
use crate::realtime::{subscription, Subscription};
use crate::store::{Collection, Direction, DocumentStore, Query, WriteBatch};

/// Default page size for `get_by_thread`.
pub const DEFAULT_THREAD_PAGE: usize = 50;
/// Default page size for `get_by_author`.
pub const DEFAULT_AUTHOR_PAGE: usize = 20;

#[derive(Clone)]
pub struct MessageService {
    messages: Collection<Message>,
}

impl MessageService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            messages: Collection::new(store),
        }
    }

    /// Create a message without touching its thread. Most callers want
    /// `post`; this is the bare uniform-contract operation.
    pub async fn create(
        &self,
        thread_id: &str,
        author_id: &str,
        content: &str,
    ) -> Result<Message, ApiError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ValidationError::empty("content").into());
        }

        let now = Utc::now().timestamp_millis();
        Ok(self
            .messages
            .insert(json!({
                "content": content,
                "thread_id": thread_id,
                "author_id": author_id,
                "created_at": now,
                "updated_at": now,
            }))
            .await?)
    }

    /// Post a message into a thread: the message insert and the thread's
    /// `last_message_at` bump commit together or not at all. Fails with
    /// `NotFound` when the thread does not exist, leaving no message behind.
    pub async fn post(
        &self,
        thread_id: &str,
        author_id: &str,
        content: &str,
    ) -> Result<Message, ApiError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ValidationError::empty("content").into());
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().timestamp_millis();
        let doc = json!({
            "id": id,
            "content": content,
            "thread_id": thread_id,
            "author_id": author_id,
            "created_at": now,
            "updated_at": now,
        });

        let batch = WriteBatch::new()
            .insert(Message::COLLECTION, &id, doc.clone())
            .update(
                Thread::COLLECTION,
                thread_id,
                json!({"last_message_at": now, "updated_at": now}),
            );
        self.messages.store().apply(batch).await?;

        let message: Message = serde_json::from_value(doc).map_err(PersistenceError::from)?;
        tracing::debug!("posted message {} to thread {}", message.id, thread_id);
        Ok(message)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Message>, ApiError> {
        Ok(self.messages.get(id).await?)
    }

    /// Messages in a thread, newest first.
    pub async fn get_by_thread(
        &self,
        thread_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, ApiError> {
        Ok(self
            .messages
            .list(
                Query::new()
                    .filter("thread_id", thread_id)
                    .order_by("created_at", Direction::Desc)
                    .limit(limit.unwrap_or(DEFAULT_THREAD_PAGE)),
            )
            .await?)
    }

    /// Messages a user has authored, newest first.
    pub async fn get_by_author(
        &self,
        author_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, ApiError> {
        Ok(self
            .messages
            .list(
                Query::new()
                    .filter("author_id", author_id)
                    .order_by("created_at", Direction::Desc)
                    .limit(limit.unwrap_or(DEFAULT_AUTHOR_PAGE)),
            )
            .await?)
    }

    /// Edit a message body. `thread_id` and `author_id` are immutable.
    pub async fn update(&self, id: &str, patch: MessagePatch) -> Result<Message, ApiError> {
        let current = self
            .messages
            .get(id)
            .await?
            .ok_or_else(|| PersistenceError::not_found(Message::COLLECTION, id))?;

        let mut fields = serde_json::Map::new();
        if let Some(content) = patch.content {
            let content = content.trim().to_string();
            if content.is_empty() {
                return Err(ValidationError::empty("content").into());
            }
            fields.insert("content".to_string(), Value::String(content));
        }
        fields.insert(
            "updated_at".to_string(),
            advance_stamp(current.updated_at).into(),
        );

        Ok(self.messages.update(id, Value::Object(fields)).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        Ok(self.messages.delete(id).await?)
    }

    /// Live mirror of `get_by_thread` with the default page size.
    pub fn subscribe_by_thread(&self, thread_id: &str) -> Subscription<Vec<Message>> {
        let events = self.messages.watch();
        let messages = self.messages.clone();
        let thread_id = thread_id.to_string();
        subscription::spawn(events, move || {
            let messages = messages.clone();
            let thread_id = thread_id.clone();
            async move {
                messages
                    .list(
                        Query::new()
                            .filter("thread_id", thread_id)
                            .order_by("created_at", Direction::Desc)
                            .limit(DEFAULT_THREAD_PAGE),
                    )
                    .await
            }
        })
    }
}

/**
 * Message Model
 *
 * A single authored post within a thread.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Entity;

/// A chat-like message inside a thread.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Unique message ID (assigned by the store on creation)
    pub id: String,
    /// Message body (non-empty)
    pub content: String,
    /// Owning thread (immutable after creation)
    pub thread_id: String,
    /// Authoring user (immutable after creation)
    pub author_id: String,
    /// Created at timestamp
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for Message {
    const COLLECTION: &'static str = "messages";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Mutable fields of a message. `thread_id` and `author_id` are immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagePatch {
    pub content: Option<String>,
}

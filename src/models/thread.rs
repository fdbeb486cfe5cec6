/**
 * Thread Model
 *
 * A named discussion within a category, containing ordered messages.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Entity;

/// A discussion thread.
///
/// `category_id` references a `Category` advisorily: a thread whose category
/// has been deleted is an orphan and surfaces as an empty state, not an
/// error. `last_message_at` is bumped whenever a message is posted and is
/// never earlier than `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Thread {
    /// Unique thread ID (assigned by the store on creation)
    pub id: String,
    /// Display name (non-empty)
    pub name: String,
    /// Owning category (immutable after creation)
    pub category_id: String,
    /// Authoring user (immutable after creation)
    pub author_id: String,
    /// Created at timestamp
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    /// Timestamp of the most recent message
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_message_at: DateTime<Utc>,
}

impl Entity for Thread {
    const COLLECTION: &'static str = "threads";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Mutable fields of a thread. The foreign keys (`category_id`, `author_id`)
/// are immutable and deliberately absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadPatch {
    pub name: Option<String>,
}

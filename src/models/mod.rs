/**
 * Entity Models
 *
 * Plain records for the four forum entities, each keyed by an opaque string
 * id assigned on creation and carrying UTC timestamps. Timestamps are
 * serialized as epoch milliseconds so they sort correctly inside store
 * documents.
 *
 * The `Entity` trait ties a record to its logical collection name in the
 * document store and is what the typed `Collection<T>` wrapper is generic
 * over.
 *
 * Relationships (advisory only, never enforced at the data layer):
 * Category 1-* Thread 1-* Message; UserProfile authors Threads and Messages.
 */

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

pub mod category;
pub mod message;
pub mod profile;
pub mod thread;

pub use category::{Category, CategoryPatch};
pub use message::{Message, MessagePatch};
pub use profile::{ProfilePatch, UserProfile};
pub use thread::{Thread, ThreadPatch};

/// A record stored in a named collection of the document store.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Logical collection name, e.g. `"categories"`.
    const COLLECTION: &'static str;

    /// The entity's opaque identifier.
    fn id(&self) -> &str;
}

/// Millisecond stamp for an update. The clock has millisecond resolution,
/// so a write landing in the same millisecond as the previous one is pushed
/// one past it; `updated_at` stays strictly monotonic per document.
pub(crate) fn advance_stamp(prev: DateTime<Utc>) -> i64 {
    Utc::now()
        .timestamp_millis()
        .max(prev.timestamp_millis() + 1)
}

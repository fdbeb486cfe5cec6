/**
 * Document Store Port
 *
 * The external document database is consumed through the `DocumentStore`
 * trait: insert, put (explicit id), get-by-id, batch get, filtered/ordered
 * list, shallow-merge update, idempotent delete, an all-or-nothing write
 * batch, and a per-collection change feed.
 *
 * Two adapters implement the port:
 * - `MemoryStore` - in-process maps, the default when no database is
 *   configured and the fixture used by tests
 * - `SqliteStore` - a single `documents` table queried with `json_extract`
 *
 * Documents are plain JSON objects with their `id` field embedded; every
 * write keeps the embedded id consistent with the row key. A `StoreEvent`
 * is published on the collection's change feed only after the write has
 * committed.
 */

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::PersistenceError;

pub mod collection;
pub mod hub;
pub mod memory;
pub mod query;
pub mod sqlite;

pub use collection::Collection;
pub use hub::ChangeHub;
pub use memory::MemoryStore;
pub use query::{Direction, Query};
pub use sqlite::SqliteStore;

/// What happened to a document, published after the write commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub collection: String,
    pub id: String,
    pub kind: ChangeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// A batched write op. Batches apply all-or-nothing: if any op fails, no op
/// in the batch is visible.
#[derive(Debug, Clone)]
pub enum BatchOp {
    /// Insert a new document under a caller-chosen id
    Insert {
        collection: String,
        id: String,
        doc: Value,
    },
    /// Shallow-merge a patch into an existing document; fails the whole
    /// batch with `NotFound` if the document is absent
    Update {
        collection: String,
        id: String,
        patch: Value,
    },
    /// Remove a document (no-op when already absent)
    Delete { collection: String, id: String },
}

/// An ordered list of writes applied atomically.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        mut self,
        collection: impl Into<String>,
        id: impl Into<String>,
        doc: Value,
    ) -> Self {
        self.ops.push(BatchOp::Insert {
            collection: collection.into(),
            id: id.into(),
            doc,
        });
        self
    }

    pub fn update(
        mut self,
        collection: impl Into<String>,
        id: impl Into<String>,
        patch: Value,
    ) -> Self {
        self.ops.push(BatchOp::Update {
            collection: collection.into(),
            id: id.into(),
            patch,
        });
        self
    }

    pub fn delete(mut self, collection: impl Into<String>, id: impl Into<String>) -> Self {
        self.ops.push(BatchOp::Delete {
            collection: collection.into(),
            id: id.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub(crate) fn ops(&self) -> &[BatchOp] {
        &self.ops
    }
}

/// Generic interface over the hosted document database.
///
/// A get miss is `Ok(None)`; only `update` treats a missing document as an
/// error, because its result would otherwise be unobservable.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a new document; the store assigns the id and returns the
    /// stored document with the id embedded.
    async fn insert(&self, collection: &str, doc: Value) -> Result<Value, PersistenceError>;

    /// Persist a document under a caller-supplied id (used for profiles,
    /// whose id must equal the identity provider's user id).
    async fn put(&self, collection: &str, id: &str, doc: Value) -> Result<(), PersistenceError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, PersistenceError>;

    /// Fetch all existing documents for an id set; absent ids are skipped.
    async fn get_many(
        &self,
        collection: &str,
        ids: &[String],
    ) -> Result<Vec<Value>, PersistenceError>;

    async fn list(&self, collection: &str, query: Query) -> Result<Vec<Value>, PersistenceError>;

    /// Shallow-merge `patch` into the document and return the merged result.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> Result<Value, PersistenceError>;

    /// Unconditional hard delete; deleting an absent document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), PersistenceError>;

    /// Apply a write batch atomically; events for the contained writes are
    /// published only after the whole batch commits.
    async fn apply(&self, batch: WriteBatch) -> Result<(), PersistenceError>;

    /// Subscribe to the collection's change feed.
    fn watch(&self, collection: &str) -> broadcast::Receiver<StoreEvent>;
}

/// Shallow-merge the fields of a patch object into a document object.
pub(crate) fn merge_patch(doc: &mut Value, patch: &Value) {
    if let (Some(target), Some(fields)) = (doc.as_object_mut(), patch.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
}

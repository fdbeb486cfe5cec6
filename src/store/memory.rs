/**
 * In-Memory Store Adapter
 *
 * The default `DocumentStore` when no `DATABASE_URL` is configured, and the
 * fixture every test suite runs against. Documents live in a
 * `RwLock<HashMap<collection, BTreeMap<id, doc>>>`; change events go through
 * a `ChangeHub`.
 *
 * Batch application validates every op against the current state before
 * touching it, so a failing batch leaves nothing behind. Events are
 * published only after the lock is released.
 */

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, RwLock};

use crate::error::PersistenceError;
use crate::store::{
    merge_patch, BatchOp, ChangeHub, ChangeKind, DocumentStore, Query, StoreEvent, WriteBatch,
};

type Collections = HashMap<String, BTreeMap<String, Value>>;

#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
    hub: ChangeHub,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The store's change hub, exposed so tests can observe watcher counts.
    pub fn hub(&self) -> &ChangeHub {
        &self.hub
    }

    fn created_event(collection: &str, id: &str) -> StoreEvent {
        StoreEvent {
            collection: collection.to_string(),
            id: id.to_string(),
            kind: ChangeKind::Created,
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, mut doc: Value) -> Result<Value, PersistenceError> {
        let id = uuid::Uuid::new_v4().to_string();
        doc["id"] = Value::String(id.clone());

        {
            let mut collections = self.collections.write().await;
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.clone(), doc.clone());
        }

        self.hub.publish(Self::created_event(collection, &id));
        Ok(doc)
    }

    async fn put(&self, collection: &str, id: &str, mut doc: Value) -> Result<(), PersistenceError> {
        doc["id"] = Value::String(id.to_string());

        let existed = {
            let mut collections = self.collections.write().await;
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), doc)
                .is_some()
        };

        self.hub.publish(StoreEvent {
            collection: collection.to_string(),
            id: id.to_string(),
            kind: if existed {
                ChangeKind::Updated
            } else {
                ChangeKind::Created
            },
        });
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, PersistenceError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn get_many(
        &self,
        collection: &str,
        ids: &[String],
    ) -> Result<Vec<Value>, PersistenceError> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(ids.iter().filter_map(|id| docs.get(id)).cloned().collect())
    }

    async fn list(&self, collection: &str, query: Query) -> Result<Vec<Value>, PersistenceError> {
        let collections = self.collections.read().await;
        let docs = collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        Ok(query.evaluate(docs))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> Result<Value, PersistenceError> {
        let updated = {
            let mut collections = self.collections.write().await;
            let doc = collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| PersistenceError::not_found(collection, id))?;
            merge_patch(doc, &patch);
            doc.clone()
        };

        self.hub.publish(StoreEvent {
            collection: collection.to_string(),
            id: id.to_string(),
            kind: ChangeKind::Updated,
        });
        Ok(updated)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), PersistenceError> {
        let removed = {
            let mut collections = self.collections.write().await;
            collections
                .get_mut(collection)
                .and_then(|docs| docs.remove(id))
                .is_some()
        };

        if removed {
            self.hub.publish(StoreEvent {
                collection: collection.to_string(),
                id: id.to_string(),
                kind: ChangeKind::Deleted,
            });
        }
        Ok(())
    }

    async fn apply(&self, batch: WriteBatch) -> Result<(), PersistenceError> {
        let mut events = Vec::with_capacity(batch.len());

        {
            let mut collections = self.collections.write().await;

            // Validate everything first so a failing batch applies nothing.
            for op in batch.ops() {
                if let BatchOp::Update { collection, id, .. } = op {
                    let exists = collections
                        .get(collection)
                        .map(|docs| docs.contains_key(id))
                        .unwrap_or(false);
                    if !exists {
                        return Err(PersistenceError::not_found(collection.clone(), id.clone()));
                    }
                }
            }

            for op in batch.ops() {
                match op {
                    BatchOp::Insert {
                        collection,
                        id,
                        doc,
                    } => {
                        let mut doc = doc.clone();
                        doc["id"] = Value::String(id.clone());
                        collections
                            .entry(collection.clone())
                            .or_default()
                            .insert(id.clone(), doc);
                        events.push(StoreEvent {
                            collection: collection.clone(),
                            id: id.clone(),
                            kind: ChangeKind::Created,
                        });
                    }
                    BatchOp::Update {
                        collection,
                        id,
                        patch,
                    } => {
                        // Existence checked above
                        let doc = collections
                            .get_mut(collection)
                            .and_then(|docs| docs.get_mut(id))
                            .expect("validated batch update target");
                        merge_patch(doc, patch);
                        events.push(StoreEvent {
                            collection: collection.clone(),
                            id: id.clone(),
                            kind: ChangeKind::Updated,
                        });
                    }
                    BatchOp::Delete { collection, id } => {
                        let removed = collections
                            .get_mut(collection)
                            .and_then(|docs| docs.remove(id))
                            .is_some();
                        if removed {
                            events.push(StoreEvent {
                                collection: collection.clone(),
                                id: id.clone(),
                                kind: ChangeKind::Deleted,
                            });
                        }
                    }
                }
            }
        }

        for event in events {
            self.hub.publish(event);
        }
        Ok(())
    }

    fn watch(&self, collection: &str) -> broadcast::Receiver<StoreEvent> {
        self.hub.watch(collection)
    }
}

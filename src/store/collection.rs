/**
 * Typed Collection Wrapper
 *
 * `Collection<T>` de/serializes entities at the port boundary so the
 * services never touch raw JSON for reads. The collection name comes from
 * `T::COLLECTION`.
 */

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::PersistenceError;
use crate::models::Entity;
use crate::store::{DocumentStore, Query, StoreEvent};

pub struct Collection<T: Entity> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> Collection<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// The underlying untyped store (for batch writes spanning collections).
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Insert a document and return the stored entity, id included.
    pub async fn insert(&self, doc: Value) -> Result<T, PersistenceError> {
        let stored = self.store.insert(T::COLLECTION, doc).await?;
        Ok(serde_json::from_value(stored)?)
    }

    /// Persist an entity under its own id.
    pub async fn put(&self, entity: &T) -> Result<(), PersistenceError> {
        let doc = serde_json::to_value(entity)?;
        self.store.put(T::COLLECTION, entity.id(), doc).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>, PersistenceError> {
        match self.store.get(T::COLLECTION, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn get_many(&self, ids: &[String]) -> Result<Vec<T>, PersistenceError> {
        let docs = self.store.get_many(T::COLLECTION, ids).await?;
        docs.into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(PersistenceError::from))
            .collect()
    }

    pub async fn list(&self, query: Query) -> Result<Vec<T>, PersistenceError> {
        let docs = self.store.list(T::COLLECTION, query).await?;
        docs.into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(PersistenceError::from))
            .collect()
    }

    /// Shallow-merge a patch and return the updated entity.
    pub async fn update(&self, id: &str, patch: Value) -> Result<T, PersistenceError> {
        let doc = self.store.update(T::COLLECTION, id, patch).await?;
        Ok(serde_json::from_value(doc)?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), PersistenceError> {
        self.store.delete(T::COLLECTION, id).await
    }

    pub fn watch(&self) -> broadcast::Receiver<StoreEvent> {
        self.store.watch(T::COLLECTION)
    }
}

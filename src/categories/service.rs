/**
 * Category Service
 *
 * CRUD, listing, and live subscription for categories. Listing is always
 * ordered by name ascending (the sidebar order).
 *
 * Deleting a category cascades to its threads and their messages in a
 * single atomic write batch, so a half-deleted category is never
 * observable.
 */

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};

use crate::error::{ApiError, PersistenceError, ValidationError};
use crate::models::{advance_stamp, Category, CategoryPatch, Entity, Message, Thread};
use crate::realtime::{subscription, Subscription};
use crate::store::{Collection, Direction, DocumentStore, Query, WriteBatch};

#[derive(Clone)]
pub struct CategoryService {
    categories: Collection<Category>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            categories: Collection::new(store),
        }
    }

    /// Create a category. Stamps `created_at == updated_at` from a single
    /// clock read and returns the stored entity with its generated id.
    pub async fn create(&self, name: &str) -> Result<Category, ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::empty("name").into());
        }

        let now = Utc::now().timestamp_millis();
        let category = self
            .categories
            .insert(json!({
                "name": name,
                "created_at": now,
                "updated_at": now,
            }))
            .await?;

        tracing::info!("created category {} ({})", category.name, category.id);
        Ok(category)
    }

    /// A missing category is `Ok(None)`, never an error.
    pub async fn get(&self, id: &str) -> Result<Option<Category>, ApiError> {
        Ok(self.categories.get(id).await?)
    }

    /// All categories, name ascending.
    pub async fn get_all(&self) -> Result<Vec<Category>, ApiError> {
        Ok(self
            .categories
            .list(Query::new().order_by("name", Direction::Asc))
            .await?)
    }

    /// Rename a category. Always bumps `updated_at` strictly past its
    /// previous value; `id` and `created_at` cannot be touched through the
    /// typed patch.
    pub async fn update(&self, id: &str, patch: CategoryPatch) -> Result<Category, ApiError> {
        let current = self
            .categories
            .get(id)
            .await?
            .ok_or_else(|| PersistenceError::not_found(Category::COLLECTION, id))?;

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

        Ok(self.categories.update(id, Value::Object(fields)).await?)
    }

    /// Hard delete of the category document only. No existence check and no
    /// cascade; orphaned threads are tolerated.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        Ok(self.categories.delete(id).await?)
    }

    /// Delete the category together with its threads and their messages,
    /// all-or-nothing.
    pub async fn delete_cascade(&self, id: &str) -> Result<(), ApiError> {
        let store = self.categories.store();

        let threads = store
            .list(Thread::COLLECTION, Query::new().filter("category_id", id))
            .await?;

        let mut batch = WriteBatch::new();
        for thread in &threads {
            let thread_id = thread.get("id").and_then(Value::as_str).unwrap_or_default();
            let messages = store
                .list(
                    Message::COLLECTION,
                    Query::new().filter("thread_id", thread_id),
                )
                .await?;
            for message in &messages {
                let message_id = message.get("id").and_then(Value::as_str).unwrap_or_default();
                batch = batch.delete(Message::COLLECTION, message_id);
            }
            batch = batch.delete(Thread::COLLECTION, thread_id);
        }
        batch = batch.delete(Category::COLLECTION, id);

        let writes = batch.len();
        store.apply(batch).await?;
        tracing::info!("cascade-deleted category {} ({} writes)", id, writes);
        Ok(())
    }

    /// Live mirror of `get_all`: the current category list now, and again
    /// after every category change.
    pub fn subscribe_all(&self) -> Subscription<Vec<Category>> {
        let events = self.categories.watch();
        let categories = self.categories.clone();
        subscription::spawn(events, move || {
            let categories = categories.clone();
            async move {
                categories
                    .list(Query::new().order_by("name", Direction::Asc))
                    .await
            }
        })
    }
}

/**
 * SQLite Store Adapter
 *
 * `DocumentStore` backed by a single `documents(collection, id, data)`
 * table. Documents are stored as JSON text; filters and ordering are pushed
 * down with `json_extract`. Schema setup runs through sqlx migrations.
 *
 * Change events are emitted by this adapter after its own commits, so
 * subscriptions observe writes made through this process - matching the
 * single client context the service runs as.
 */

use std::str::FromStr;

use serde_json::Value;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};
use tokio::sync::broadcast;

use crate::error::PersistenceError;
use crate::store::{
    merge_patch, BatchOp, ChangeHub, ChangeKind, DocumentStore, Query, StoreEvent, WriteBatch,
};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    hub: ChangeHub,
}

type ScalarQuery<'q> = sqlx::query::QueryScalar<'q, Sqlite, String, SqliteArguments<'q>>;

impl SqliteStore {
    /// Open (creating if missing) the database at `url` and run migrations.
    pub async fn connect(url: &str) -> Result<Self, PersistenceError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(PersistenceError::from)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| PersistenceError::backend(e.to_string()))?;

        tracing::info!("sqlite store ready at {}", url);
        Ok(Self {
            pool,
            hub: ChangeHub::new(),
        })
    }

    pub fn hub(&self) -> &ChangeHub {
        &self.hub
    }

    fn publish(&self, collection: &str, id: &str, kind: ChangeKind) {
        self.hub.publish(StoreEvent {
            collection: collection.to_string(),
            id: id.to_string(),
            kind,
        });
    }
}

/// Bind a JSON value as the closest SQLite type so `json_extract` results
/// compare correctly.
fn bind_value<'q>(query: ScalarQuery<'q>, value: &Value) -> ScalarQuery<'q> {
    match value {
        Value::String(s) => query.bind(s.clone()),
        Value::Number(n) if n.is_i64() => query.bind(n.as_i64().unwrap_or(0)),
        Value::Number(n) => query.bind(n.as_f64().unwrap_or(0.0)),
        Value::Bool(b) => query.bind(*b),
        other => query.bind(other.to_string()),
    }
}

/// Field names come from service code, never from request input; keep the
/// interpolation guard anyway.
fn json_path(field: &str) -> String {
    debug_assert!(field
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_'));
    format!("json_extract(data, '$.{}')", field)
}

async fn update_in_tx(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    collection: &str,
    id: &str,
    patch: &Value,
) -> Result<Value, PersistenceError> {
    let raw: Option<String> =
        sqlx::query_scalar("SELECT data FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

    let raw = raw.ok_or_else(|| PersistenceError::not_found(collection, id))?;
    let mut doc: Value = serde_json::from_str(&raw)?;
    merge_patch(&mut doc, patch);

    sqlx::query("UPDATE documents SET data = ? WHERE collection = ? AND id = ?")
        .bind(doc.to_string())
        .bind(collection)
        .bind(id)
        .execute(&mut **tx)
        .await?;

    Ok(doc)
}

#[async_trait::async_trait]
impl DocumentStore for SqliteStore {
    async fn insert(&self, collection: &str, mut doc: Value) -> Result<Value, PersistenceError> {
        let id = uuid::Uuid::new_v4().to_string();
        doc["id"] = Value::String(id.clone());

        sqlx::query("INSERT INTO documents (collection, id, data) VALUES (?, ?, ?)")
            .bind(collection)
            .bind(&id)
            .bind(doc.to_string())
            .execute(&self.pool)
            .await?;

        self.publish(collection, &id, ChangeKind::Created);
        Ok(doc)
    }

    async fn put(&self, collection: &str, id: &str, mut doc: Value) -> Result<(), PersistenceError> {
        doc["id"] = Value::String(id.to_string());

        // The upsert reports one affected row either way, so check existence
        // in the same transaction to publish the right event kind.
        let mut tx = self.pool.begin().await?;
        let existed: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM documents WHERE collection = ? AND id = ?")
                .bind(collection)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        sqlx::query(
            "INSERT INTO documents (collection, id, data) VALUES (?, ?, ?) \
             ON CONFLICT (collection, id) DO UPDATE SET data = excluded.data",
        )
        .bind(collection)
        .bind(id)
        .bind(doc.to_string())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        let kind = if existed.is_some() {
            ChangeKind::Updated
        } else {
            ChangeKind::Created
        };
        self.publish(collection, id, kind);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, PersistenceError> {
        let raw: Option<String> =
            sqlx::query_scalar("SELECT data FROM documents WHERE collection = ? AND id = ?")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn get_many(
        &self,
        collection: &str,
        ids: &[String],
    ) -> Result<Vec<Value>, PersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT data FROM documents WHERE collection = ? AND id IN ({})",
            placeholders
        );

        let mut query = sqlx::query_scalar::<_, String>(&sql).bind(collection);
        for id in ids {
            query = query.bind(id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|raw| serde_json::from_str(raw).map_err(PersistenceError::from))
            .collect()
    }

    async fn list(&self, collection: &str, query: Query) -> Result<Vec<Value>, PersistenceError> {
        let mut sql = String::from("SELECT data FROM documents WHERE collection = ?");
        for (field, _) in query.filters() {
            sql.push_str(&format!(" AND {} = ?", json_path(field)));
        }
        if let Some((field, direction)) = query.order() {
            sql.push_str(&format!(
                " ORDER BY {} {}",
                json_path(field),
                match direction {
                    crate::store::Direction::Asc => "ASC",
                    crate::store::Direction::Desc => "DESC",
                }
            ));
        }
        if let Some(limit) = query.limit_value() {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut scalar = sqlx::query_scalar::<_, String>(&sql).bind(collection);
        for (_, value) in query.filters() {
            scalar = bind_value(scalar, value);
        }

        let rows = scalar.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|raw| serde_json::from_str(raw).map_err(PersistenceError::from))
            .collect()
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> Result<Value, PersistenceError> {
        let mut tx = self.pool.begin().await?;
        let doc = update_in_tx(&mut tx, collection, id, &patch).await?;
        tx.commit().await?;

        self.publish(collection, id, ChangeKind::Updated);
        Ok(doc)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), PersistenceError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            self.publish(collection, id, ChangeKind::Deleted);
        }
        Ok(())
    }

    async fn apply(&self, batch: WriteBatch) -> Result<(), PersistenceError> {
        let mut tx = self.pool.begin().await?;
        let mut events = Vec::with_capacity(batch.len());

        for op in batch.ops() {
            match op {
                BatchOp::Insert {
                    collection,
                    id,
                    doc,
                } => {
                    let mut doc = doc.clone();
                    doc["id"] = Value::String(id.clone());
                    sqlx::query("INSERT INTO documents (collection, id, data) VALUES (?, ?, ?)")
                        .bind(collection)
                        .bind(id)
                        .bind(doc.to_string())
                        .execute(&mut *tx)
                        .await?;
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
                    update_in_tx(&mut tx, collection, id, patch).await?;
                    events.push(StoreEvent {
                        collection: collection.clone(),
                        id: id.clone(),
                        kind: ChangeKind::Updated,
                    });
                }
                BatchOp::Delete { collection, id } => {
                    let result =
                        sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
                            .bind(collection)
                            .bind(id)
                            .execute(&mut *tx)
                            .await?;
                    if result.rows_affected() > 0 {
                        events.push(StoreEvent {
                            collection: collection.clone(),
                            id: id.clone(),
                            kind: ChangeKind::Deleted,
                        });
                    }
                }
            }
        }

        tx.commit().await?;

        for event in events {
            self.hub.publish(event);
        }
        Ok(())
    }

    fn watch(&self, collection: &str) -> broadcast::Receiver<StoreEvent> {
        self.hub.watch(collection)
    }
}

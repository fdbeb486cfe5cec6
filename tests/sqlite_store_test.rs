/**
 * Sqlite Store Tests
 *
 * The same port contract the in-memory adapter is tested against, run
 * over a real sqlite file: CRUD, query pushdown, batch atomicity, change
 * events, and persistence across a reconnect.
 */

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use palaver::error::PersistenceError;
use palaver::store::{ChangeKind, Direction, DocumentStore, Query, SqliteStore, WriteBatch};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

async fn open_store() -> (TempDir, SqliteStore) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let store = SqliteStore::connect(&url).await.unwrap();
    (dir, store)
}

#[tokio::test]
async fn test_insert_assigns_id_and_roundtrips() {
    let (_dir, store) = open_store().await;

    let stored = store
        .insert("categories", json!({"name": "General", "created_at": 1}))
        .await
        .unwrap();
    let id = stored["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let fetched = store.get("categories", &id).await.unwrap().unwrap();
    assert_eq!(fetched, stored);
}

#[tokio::test]
async fn test_get_miss_is_none() {
    let (_dir, store) = open_store().await;
    assert!(store.get("categories", "absent").await.unwrap().is_none());
}

#[tokio::test]
async fn test_put_upserts() {
    let (_dir, store) = open_store().await;

    store
        .put("users", "u1", json!({"id": "u1", "username": "alice"}))
        .await
        .unwrap();
    store
        .put("users", "u1", json!({"id": "u1", "username": "alice2"}))
        .await
        .unwrap();

    let doc = store.get("users", "u1").await.unwrap().unwrap();
    assert_eq!(doc["username"], "alice2");
}

#[tokio::test]
async fn test_put_reports_created_then_updated() {
    let (_dir, store) = open_store().await;
    let mut events = store.watch("users");

    store
        .put("users", "u1", json!({"id": "u1", "username": "alice"}))
        .await
        .unwrap();
    store
        .put("users", "u1", json!({"id": "u1", "username": "alice2"}))
        .await
        .unwrap();

    let first = tokio::time::timeout(RECV_TIMEOUT, events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.kind, ChangeKind::Created);

    let second = tokio::time::timeout(RECV_TIMEOUT, events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.id, "u1");
    assert_eq!(second.kind, ChangeKind::Updated);
}

#[tokio::test]
async fn test_update_merges_and_misses_are_not_found() {
    let (_dir, store) = open_store().await;

    store
        .put("threads", "t1", json!({"id": "t1", "name": "old", "views": 3}))
        .await
        .unwrap();

    let merged = store
        .update("threads", "t1", json!({"name": "new"}))
        .await
        .unwrap();
    assert_eq!(merged["name"], "new");
    assert_eq!(merged["views"], 3);

    let result = store.update("threads", "ghost", json!({"name": "x"})).await;
    assert!(matches!(result, Err(PersistenceError::NotFound { .. })));
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let (_dir, store) = open_store().await;

    store.put("users", "u1", json!({"id": "u1"})).await.unwrap();
    store.delete("users", "u1").await.unwrap();
    store.delete("users", "u1").await.unwrap();
    assert!(store.get("users", "u1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_filters_orders_and_limits() {
    let (_dir, store) = open_store().await;

    for (id, category, stamp) in [
        ("t1", "a", 30),
        ("t2", "a", 10),
        ("t3", "b", 20),
        ("t4", "a", 20),
    ] {
        store
            .put(
                "threads",
                id,
                json!({"id": id, "category_id": category, "last_message_at": stamp}),
            )
            .await
            .unwrap();
    }

    let listed = store
        .list(
            "threads",
            Query::new()
                .filter("category_id", "a")
                .order_by("last_message_at", Direction::Desc)
                .limit(2),
        )
        .await
        .unwrap();

    let ids: Vec<&str> = listed.iter().map(|d| d["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["t1", "t4"]);
}

#[tokio::test]
async fn test_get_many_skips_absent_ids() {
    let (_dir, store) = open_store().await;

    store.put("users", "u1", json!({"id": "u1"})).await.unwrap();
    store.put("users", "u2", json!({"id": "u2"})).await.unwrap();

    let fetched = store
        .get_many(
            "users",
            &["u1".to_string(), "ghost".to_string(), "u2".to_string()],
        )
        .await
        .unwrap();
    assert_eq!(fetched.len(), 2);
}

#[tokio::test]
async fn test_failed_batch_leaves_no_partial_writes() {
    let (_dir, store) = open_store().await;

    let batch = WriteBatch::new()
        .insert("messages", "m1", json!({"id": "m1", "content": "hi"}))
        .update("threads", "missing-thread", json!({"last_message_at": 99}));

    let result = store.apply(batch).await;
    assert!(matches!(result, Err(PersistenceError::NotFound { .. })));

    // The insert rolled back with the failed update.
    assert!(store.get("messages", "m1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_batch_publishes_events_after_commit() {
    let (_dir, store) = open_store().await;
    store
        .put("threads", "t1", json!({"id": "t1", "last_message_at": 0}))
        .await
        .unwrap();

    let mut messages = store.watch("messages");
    let mut threads = store.watch("threads");

    let batch = WriteBatch::new()
        .insert("messages", "m1", json!({"id": "m1", "content": "hi"}))
        .update("threads", "t1", json!({"last_message_at": 42}));
    store.apply(batch).await.unwrap();

    let created = tokio::time::timeout(RECV_TIMEOUT, messages.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.id, "m1");
    assert_eq!(created.kind, ChangeKind::Created);

    let updated = tokio::time::timeout(RECV_TIMEOUT, threads.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.id, "t1");
    assert_eq!(updated.kind, ChangeKind::Updated);
}

#[tokio::test]
async fn test_documents_survive_a_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("test.db").display());

    {
        let store = SqliteStore::connect(&url).await.unwrap();
        store
            .put("categories", "c1", json!({"id": "c1", "name": "Kept"}))
            .await
            .unwrap();
    }

    let store = SqliteStore::connect(&url).await.unwrap();
    let doc = store.get("categories", "c1").await.unwrap().unwrap();
    assert_eq!(doc["name"], "Kept");
}

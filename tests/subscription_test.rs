/**
 * Subscription Tests
 *
 * Live-query behavior end to end: the immediate snapshot, refreshes on
 * change, suppression of irrelevant changes, and the scoped release of the
 * listener when the handle is dropped or unsubscribed.
 */

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use palaver::categories::CategoryService;
use palaver::messages::MessageService;
use palaver::store::{DocumentStore, MemoryStore};
use palaver::threads::ThreadService;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

fn memory_store() -> (Arc<MemoryStore>, Arc<dyn DocumentStore>) {
    let store = Arc::new(MemoryStore::new());
    let dyn_store: Arc<dyn DocumentStore> = store.clone();
    (store, dyn_store)
}

/// Abort delivery is asynchronous; poll until the watcher count settles.
async fn wait_for_watchers(store: &MemoryStore, collection: &str, expected: usize) {
    for _ in 0..50 {
        if store.hub().watcher_count(collection) == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(store.hub().watcher_count(collection), expected);
}

#[tokio::test]
async fn test_subscription_delivers_initial_snapshot() {
    let (_, store) = memory_store();
    let categories = CategoryService::new(store);
    categories.create("Existing").await.unwrap();

    let mut subscription = categories.subscribe_all();
    let snapshot = tokio::time::timeout(RECV_TIMEOUT, subscription.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].name, "Existing");
}

#[tokio::test]
async fn test_subscription_refreshes_on_change() {
    let (_, store) = memory_store();
    let categories = CategoryService::new(store);

    let mut subscription = categories.subscribe_all();
    let initial = tokio::time::timeout(RECV_TIMEOUT, subscription.next())
        .await
        .unwrap()
        .unwrap();
    assert!(initial.is_empty());

    categories.create("Fresh").await.unwrap();

    let updated = tokio::time::timeout(RECV_TIMEOUT, subscription.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].name, "Fresh");
}

#[tokio::test]
async fn test_thread_subscription_ignores_other_categories() {
    let (_, store) = memory_store();
    let threads = ThreadService::new(store);

    let mut subscription = threads.subscribe_by_category("cat-a");
    tokio::time::timeout(RECV_TIMEOUT, subscription.next())
        .await
        .unwrap()
        .unwrap();

    // A change in an unrelated category refetches but yields an identical
    // snapshot, which is suppressed.
    threads.create("elsewhere", "cat-b", "author").await.unwrap();
    threads.create("here", "cat-a", "author").await.unwrap();

    let snapshot = tokio::time::timeout(RECV_TIMEOUT, subscription.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].name, "here");
}

#[tokio::test]
async fn test_message_subscription_follows_posts() {
    let (_, store) = memory_store();
    let threads = ThreadService::new(store.clone());
    let messages = MessageService::new(store);

    let thread = threads.create("live", "cat-1", "author").await.unwrap();
    let mut subscription = messages.subscribe_by_thread(&thread.id);
    tokio::time::timeout(RECV_TIMEOUT, subscription.next())
        .await
        .unwrap()
        .unwrap();

    messages.post(&thread.id, "author", "ping").await.unwrap();

    let snapshot = tokio::time::timeout(RECV_TIMEOUT, subscription.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].content, "ping");
}

#[tokio::test]
async fn test_profile_subscription_mirrors_one_document() {
    let (_, store) = memory_store();
    let profiles = palaver::profiles::ProfileService::new(store);

    let mut subscription = profiles.subscribe("u1");
    let initial = tokio::time::timeout(RECV_TIMEOUT, subscription.next())
        .await
        .unwrap()
        .unwrap();
    assert!(initial.is_none());

    profiles.create("u1", "alice", None).await.unwrap();

    let snapshot = tokio::time::timeout(RECV_TIMEOUT, subscription.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.unwrap().username, "alice");
}

#[tokio::test]
async fn test_unsubscribe_releases_the_listener() {
    let (memory, store) = memory_store();
    let categories = CategoryService::new(store);

    let mut subscription = categories.subscribe_all();
    tokio::time::timeout(RECV_TIMEOUT, subscription.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(memory.hub().watcher_count("categories"), 1);

    subscription.unsubscribe();
    wait_for_watchers(&memory, "categories", 0).await;
}

#[tokio::test]
async fn test_drop_releases_the_listener() {
    let (memory, store) = memory_store();
    let categories = CategoryService::new(store);

    {
        let _subscription = categories.subscribe_all();
        wait_for_watchers(&memory, "categories", 1).await;
    }
    wait_for_watchers(&memory, "categories", 0).await;
}

#[tokio::test]
async fn test_two_subscriptions_release_independently() {
    let (memory, store) = memory_store();
    let categories = CategoryService::new(store);

    let first = categories.subscribe_all();
    let second = categories.subscribe_all();
    wait_for_watchers(&memory, "categories", 2).await;

    drop(first);
    wait_for_watchers(&memory, "categories", 1).await;

    second.unsubscribe();
    wait_for_watchers(&memory, "categories", 0).await;
}

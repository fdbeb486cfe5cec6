/**
 * Change Hub
 *
 * Per-collection broadcast channels carrying `StoreEvent`s. Both store
 * adapters publish through a hub after a write commits; service
 * subscriptions and SSE streams consume the receivers.
 *
 * Channels are created lazily per collection to prevent cross-talk between
 * unrelated collections.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use crate::store::StoreEvent;

/// Capacity of each per-collection channel. Snapshots are re-fetched on
/// every event, so a lagged receiver only means a redundant refresh.
const CHANNEL_CAPACITY: usize = 256;

#[derive(Clone, Default)]
pub struct ChangeHub {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<StoreEvent>>>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the sender for a collection.
    fn sender(&self, collection: &str) -> broadcast::Sender<StoreEvent> {
        let mut channels = self.channels.lock().unwrap();
        channels
            .entry(collection.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Open a receiver on a collection's change feed.
    pub fn watch(&self, collection: &str) -> broadcast::Receiver<StoreEvent> {
        self.sender(collection).subscribe()
    }

    /// Publish a committed change to all watchers of its collection.
    pub fn publish(&self, event: StoreEvent) {
        if let Some(sender) = self.channels.lock().unwrap().get(&event.collection) {
            // Ignore if no receivers
            let _ = sender.send(event);
        }
    }

    /// Number of open receivers on a collection (used by tests to verify
    /// subscriptions are released).
    pub fn watcher_count(&self, collection: &str) -> usize {
        self.channels
            .lock()
            .unwrap()
            .get(collection)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

/**
 * Live Query Subscriptions
 *
 * A subscription mirrors one list query: it delivers the full current
 * result set immediately, then a fresh snapshot after every committed
 * change in the query's collection. Identical consecutive snapshots are
 * suppressed so watchers only see changes relevant to their query.
 *
 * The handle is a scoped resource: `unsubscribe` consumes it, and dropping
 * it (including the drop performed by `unsubscribe`) aborts the listener
 * task deterministically. Nothing is ever delivered after the handle is
 * gone.
 */

use std::future::Future;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::error::PersistenceError;
use crate::store::StoreEvent;

/// Buffered snapshots between the listener task and the consumer. Small on
/// purpose: a slow consumer back-pressures the refetch loop.
const SNAPSHOT_BUFFER: usize = 16;

/// Handle to a live query. Must be released (dropped or `unsubscribe`d) when
/// the consuming view goes away; the listener task stops with it.
pub struct Subscription<T> {
    rx: mpsc::Receiver<T>,
    task: JoinHandle<()>,
}

impl<T> Subscription<T> {
    /// Next snapshot, or `None` once the feed has closed.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Release the subscription. Consuming `self` makes the release
    /// exactly-once by construction.
    pub fn unsubscribe(self) {}
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn the listener task backing a subscription.
///
/// `fetch` runs the mirrored query; it is invoked once for the initial
/// snapshot and again after every event on `events`. Fetch failures are
/// logged and skipped - the previous snapshot stays current, matching how
/// a lost refresh behaves for a live view.
pub(crate) fn spawn<T, F, Fut>(
    mut events: broadcast::Receiver<StoreEvent>,
    fetch: F,
) -> Subscription<T>
where
    T: Clone + PartialEq + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, PersistenceError>> + Send,
{
    let (tx, rx) = mpsc::channel(SNAPSHOT_BUFFER);

    let task = tokio::spawn(async move {
        let mut last: Option<T> = None;

        match fetch().await {
            Ok(snapshot) => {
                last = Some(snapshot.clone());
                if tx.send(snapshot).await.is_err() {
                    return;
                }
            }
            Err(e) => tracing::warn!("subscription initial fetch failed: {}", e),
        }

        loop {
            match events.recv().await {
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => match fetch().await {
                    Ok(snapshot) => {
                        if last.as_ref() == Some(&snapshot) {
                            continue;
                        }
                        last = Some(snapshot.clone());
                        if tx.send(snapshot).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => tracing::warn!("subscription refresh failed: {}", e),
                },
                Err(broadcast::error::RecvError::Closed) => return,
            }
        }
    });

    Subscription { rx, task }
}

/**
 * SSE Adaptation
 *
 * Turns a live query `Subscription` into a Server-Sent Events response.
 * Each snapshot is delivered as a `snapshot` event whose data is the full
 * JSON result set, so a client can simply replace its view on every event.
 *
 * The stream owns the subscription: when the client disconnects and axum
 * drops the stream, the subscription drops with it and the listener task is
 * released. Keep-alive comments are injected by axum's SSE layer.
 */

use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream;
use futures_util::Stream;
use serde::Serialize;

use crate::realtime::Subscription;

/// Wrap a subscription into an SSE response of `snapshot` events.
pub fn snapshot_stream<T>(
    subscription: Subscription<Vec<T>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>>
where
    T: Serialize + Clone + PartialEq + Send + 'static,
{
    let stream = stream::unfold(subscription, |mut subscription| async move {
        loop {
            match subscription.next().await {
                Some(snapshot) => match Event::default().event("snapshot").json_data(&snapshot) {
                    Ok(event) => return Some((Ok(event), subscription)),
                    Err(e) => {
                        tracing::error!("failed to serialize snapshot: {:?}", e);
                        continue;
                    }
                },
                None => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

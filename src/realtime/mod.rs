/**
 * Real-time Delivery
 *
 * Live query subscriptions over the store's change feeds and their SSE
 * adaptation:
 *
 * - `subscription` - the scoped `Subscription` handle and the listener task
 *   that re-fetches a query snapshot on every relevant change
 * - `sse` - turns a subscription into a Server-Sent Events stream
 */

pub mod sse;
pub mod subscription;

pub use subscription::Subscription;

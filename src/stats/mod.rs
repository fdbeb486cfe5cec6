/**
 * Derived Stats
 *
 * Aggregated dashboard numbers derived from the forum services. Nothing
 * here is persisted; each request recomputes from the store.
 */

pub mod handlers;
pub mod service;

pub use service::{CategoryStats, MessageStats, StatsService, ThreadStats, UserStats};

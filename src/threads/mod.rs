/**
 * Threads
 *
 * Data access service and HTTP handlers for discussion threads.
 */

pub mod handlers;
pub mod service;

pub use service::ThreadService;

/**
 * Messages
 *
 * Data access service and HTTP handlers for thread messages.
 */

pub mod handlers;
pub mod service;

pub use service::MessageService;

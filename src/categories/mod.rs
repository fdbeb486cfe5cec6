/**
 * Categories
 *
 * Data access service and HTTP handlers for forum categories.
 */

pub mod handlers;
pub mod service;

pub use service::CategoryService;

/**
 * User Profiles
 *
 * Data access service and HTTP handlers for display identities.
 */

pub mod handlers;
pub mod service;

pub use service::{is_valid_username, ProfileService};

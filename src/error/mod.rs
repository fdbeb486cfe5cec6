/**
 * Error Module
 *
 * Error types for the forum service and their conversion to HTTP responses.
 *
 * - `types` - The error taxonomy (validation, auth, persistence) and the
 *   handler-boundary `ApiError` sum
 * - `conversion` - `IntoResponse` implementation for `ApiError`
 */

pub mod conversion;
pub mod types;

pub use types::{ApiError, AuthError, PersistenceError, ValidationError};

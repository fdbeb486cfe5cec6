/**
 * Error Types
 *
 * This module defines the error taxonomy used across the service:
 *
 * - `ValidationError` - an empty or malformed required field, caught before
 *   any store call is made
 * - `AuthError` - the identity provider rejected an operation
 * - `PersistenceError` - a write or read against the document store failed;
 *   note that a get miss is `Ok(None)`, never an error
 * - `ApiError` - the handler-boundary sum over all of the above
 *
 * Handlers return `ApiError` and rely on its `IntoResponse` implementation
 * (see `conversion`) to produce a JSON error body with the right status code.
 */

use axum::http::StatusCode;
use thiserror::Error;

/// A required field failed validation before any network call was issued.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("validation failed for `{field}`: {message}")]
pub struct ValidationError {
    /// Name of the offending field
    pub field: String,
    /// Human-readable description of the problem
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for the most common case: a required field left empty.
    pub fn empty(field: impl Into<String>) -> Self {
        Self::new(field, "must not be empty")
    }
}

/// Errors surfaced by the identity provider or the session layer.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credentials did not match an account
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration attempted with an email that already has an account
    #[error("email already registered")]
    EmailInUse,

    /// Password rejected by the provider's policy
    #[error("password must be at least 8 characters")]
    WeakPassword,

    /// Email address is not plausibly an email address
    #[error("invalid email format")]
    InvalidEmail,

    /// A federated provider flow failed or was cancelled
    #[error("identity provider error: {0}")]
    Provider(String),

    /// The verification email could not be sent
    #[error("failed to send verification email: {0}")]
    SendFailed(String),

    /// Session token missing, expired, or failed signature verification
    #[error("invalid session")]
    InvalidSession,

    /// Anything else the provider reported
    #[error("authentication error: {0}")]
    Unknown(String),
}

/// Errors from the document store port.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The backing engine rejected or failed the operation
    #[error("store backend error: {0}")]
    Backend(String),

    /// A document could not be (de)serialized at the port boundary
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An update targeted a document that does not exist
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },
}

impl PersistenceError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Handler-boundary error: everything a request handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl ApiError {
    /// Map the error to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::InvalidSession => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::EmailInUse => StatusCode::CONFLICT,
                AuthError::WeakPassword | AuthError::InvalidEmail => StatusCode::BAD_REQUEST,
                AuthError::Provider(_) | AuthError::SendFailed(_) => StatusCode::BAD_GATEWAY,
                AuthError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Persistence(err) => match err {
                PersistenceError::NotFound { .. } => StatusCode::NOT_FOUND,
                PersistenceError::Backend(_) | PersistenceError::Serialization(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// User-facing message. Backend detail never leaks through a 5xx body;
    /// it is logged at the conversion site instead.
    pub fn public_message(&self) -> String {
        if self.status_code().is_server_error() {
            "internal error".to_string()
        } else {
            self.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_status() {
        let err: ApiError = ValidationError::empty("name").into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.public_message().contains("name"));
    }

    #[test]
    fn test_auth_error_statuses() {
        let cases = [
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::EmailInUse, StatusCode::CONFLICT),
            (AuthError::WeakPassword, StatusCode::BAD_REQUEST),
            (AuthError::InvalidEmail, StatusCode::BAD_REQUEST),
            (AuthError::InvalidSession, StatusCode::UNAUTHORIZED),
            (
                AuthError::Provider("popup closed".into()),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status_code(), expected);
        }
    }

    #[test]
    fn test_not_found_status() {
        let err: ApiError = PersistenceError::not_found("categories", "abc").into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_backend_error_message_is_generic() {
        let err: ApiError = PersistenceError::backend("connection refused to 10.0.0.1").into();
        assert_eq!(err.public_message(), "internal error");
    }
}

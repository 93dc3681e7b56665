//! Client error types.

use thiserror::Error;

use jasmine_auth::ResolveError;
use jasmine_core::DomainError;

/// Failure talking to the backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication required")]
    Unauthorized,

    #[error("permission denied: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("API error ({0}): {1}")]
    Api(u16, String),

    /// The backend answered `{ "success": false }`.
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Failure reading or writing persisted session state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session storage unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a [`crate::Portal`] operation.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Permissions(#[from] ResolveError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

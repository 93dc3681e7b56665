//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic data failures (validation, corrupt
/// payloads, unknown identifiers). Transport concerns belong in the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A module key outside the closed portal module set.
    #[error("unknown module: {0}")]
    UnknownModule(String),

    /// Role permission data could not be decoded.
    #[error("corrupt permission data: {0}")]
    CorruptPermissions(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn unknown_module(key: impl Into<String>) -> Self {
        Self::UnknownModule(key.into())
    }

    pub fn corrupt_permissions(msg: impl Into<String>) -> Self {
        Self::CorruptPermissions(msg.into())
    }
}

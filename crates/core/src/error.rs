//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every account/user operation fails with one of these. Component-local
/// errors (hashing, tokens, storage) are folded into this taxonomy at the
/// operation boundary; mapping to a transport status is the caller's job.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or inconsistent input; the caller can fix the request.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Missing, invalid or expired credentials carrier.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Authenticated, but not privileged enough for the action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A requested resource was not found.
    #[error("not found")]
    NotFound,

    /// Uniqueness violation (duplicate username/email, duplicate id).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Password did not match the stored hash.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Opaque persistence failure. Never retried locally.
    #[error("store error: {0}")]
    Store(String),

    /// Server-side fault unrelated to the request (bad hasher config,
    /// inconsistent stored data).
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}

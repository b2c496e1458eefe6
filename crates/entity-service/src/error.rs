//! # Service Errors
//!
//! This module defines the error types used by the entity service and its
//! collaborators. Each layer owns one enum:
//!
//! - [`RepositoryError`] - storage and transaction failures.
//! - [`MappingError`] - Model/Entity conversion failures.
//! - [`CacheError`] and [`DispatchError`] - side-channel failures. These are
//!   logged and swallowed by [`EntityService`](crate::EntityService) and never
//!   reach the caller.
//! - [`ServiceError`] - what callers of the service see.

/// Failures raised by a [`Repository`](crate::Repository) or a
/// [`UnitOfWork`](crate::UnitOfWork).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("Connection failure: {0}")]
    Connection(String),
    #[error("Transaction error: {0}")]
    Transaction(String),
}

/// Failures converting between a transport model and a persistence entity.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MappingError {
    #[error("Invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl MappingError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        MappingError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("No active subscribers")]
    NoSubscribers,
    #[error("Notification channel closed")]
    Closed,
}

/// Errors surfaced to callers of [`EntityService`](crate::EntityService).
///
/// A `Persistence` error is only returned after the transaction has been
/// rolled back.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{entity_type} not found: {key}")]
    NotFound {
        entity_type: &'static str,
        key: String,
    },
    #[error("Persistence error: {0}")]
    Persistence(#[from] RepositoryError),
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

use thiserror::Error;

use bloomshop_auth::AuthzError;
use bloomshop_core::DomainError;

use crate::store::StoreError;

/// Error returned by every service operation.
///
/// No operation that returns an error leaves partial writes behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("validation failed on `{field}`: {message}")]
    Validation { field: String, message: String },

    #[error("permission denied: {0}")]
    Permission(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The unit of work lost a race; the whole operation may be retried.
    #[error("concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    #[error(transparent)]
    Store(StoreError),
}

impl ServiceError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::ConcurrencyConflict(_))
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation { field, message } => ServiceError::Validation { field, message },
            DomainError::Permission(msg) => ServiceError::Permission(msg),
            DomainError::InvalidState(msg) => ServiceError::InvalidState(msg),
            DomainError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            DomainError::Conflict(msg) => ServiceError::ConcurrencyConflict(msg),
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(value: AuthzError) -> Self {
        ServiceError::Permission(value.to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => ServiceError::ConcurrencyConflict(msg),
            other => ServiceError::Store(other),
        }
    }
}

//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (HTTP, database).

use thiserror::Error;

use crate::service::ServiceStatus;
use crate::visibility::UnmetRequirement;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed for a field or input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Password-related errors
    #[error("Password error: {0}")]
    Password(String),

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Entity already exists (conflict)
    #[error("{0} already exists")]
    Conflict(String),

    /// Unauthorized access attempt
    #[error("Unauthorized")]
    Unauthorized,

    /// Forbidden action
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Invalid credentials provided
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The requested status change is not an edge of the visibility graph
    #[error("Transition from {from} to {to} is not allowed")]
    InvalidStateTransition {
        from: ServiceStatus,
        to: ServiceStatus,
    },

    /// Publishing was attempted while requirements are unmet
    #[error("Publication requirements not met: {}", join_requirements(.0))]
    PublicationRequirementsNotMet(Vec<UnmetRequirement>),

    /// Archiving was attempted while bookings are still open
    #[error("Service has {0} active booking(s)")]
    ActiveBookings(u64),

    /// Internal domain error
    #[error("Internal error: {0}")]
    Internal(String),
}

fn join_requirements(requirements: &[UnmetRequirement]) -> String {
    requirements
        .iter()
        .map(|r| r.message())
        .collect::<Vec<_>>()
        .join(", ")
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create a password error
    pub fn password(msg: impl Into<String>) -> Self {
        DomainError::Password(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>) -> Self {
        DomainError::NotFound(entity.into())
    }

    /// Create a conflict error
    pub fn conflict(entity: impl Into<String>) -> Self {
        DomainError::Conflict(entity.into())
    }

    /// Create a forbidden error with the reason
    pub fn forbidden(reason: impl Into<String>) -> Self {
        DomainError::Forbidden(reason.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

//! # DomainError
//!
//! Centralized error handling for the complaint desk.
//! Every port and service returns this type; the HTTP adapter maps each
//! variant to a status code.

use thiserror::Error;

/// The primary error type for all domain and service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or missing input (e.g., complaint text too short)
    #[error("validation error: {0}")]
    Validation(String),

    /// No identity claim, or a claim that failed verification
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Identity present but outside the resource's scope
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Referenced complaint, user, admin or department does not exist
    #[error("{entity} not found with ID {id}")]
    NotFound { entity: &'static str, id: String },

    /// Resource already exists (e.g., duplicate account email)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down). The message is for logs only.
    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

/// A specialized Result type for complaint desk logic.
pub type Result<T> = std::result::Result<T, DomainError>;

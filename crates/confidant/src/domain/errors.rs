//! Domain Errors
//!
//! Error types for domain operations.

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Session is busy waiting for a response")]
    SessionBusy,

    #[error("No active session")]
    NoActiveSession,

    #[error("Persistence degraded: {0}")]
    PersistenceDegraded(String),
}

impl DomainError {
    pub fn not_found<T: AsRef<str>>(entity_type: T, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.as_ref().to_string(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference(message.into())
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::PersistenceDegraded(message.into())
    }
}

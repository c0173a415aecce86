//! Domain errors for the reviewflow automation engine.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur in the reviewflow system.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Workflow not found: {0}")]
    WorkflowNotFound(Uuid),

    #[error("Execution not found: {0}")]
    ExecutionNotFound(Uuid),

    #[error("Review not found: {0}")]
    ReviewNotFound(Uuid),

    #[error("Location not found: {0}")]
    LocationNotFound(Uuid),

    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Unknown action type: {0}")]
    UnknownAction(String),

    #[error("Invalid action configuration for {kind}: {reason}")]
    InvalidActionConfig { kind: String, reason: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidStateTransition { from: String, to: String, reason: String },

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Notification failed: {0}")]
    NotificationFailed(String),

    #[error("Report generation failed: {0}")]
    ReportFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

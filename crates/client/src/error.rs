//! Client-boundary error taxonomy and user-facing notices.
//!
//! Store and domain failures are converted here, at the coordinator
//! boundary. Best-effort side effects (the chat relay) never surface as
//! errors at all; their failures are logged and dropped at the call site.

use playroom_domain::DomainError;

use crate::ports::StoreError;

/// What a session operation can fail with, from the caller's side.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Rejected before any store round trip.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The store rejected a write or the round trip failed. Optimistic
    /// state has already been reverted when this is returned.
    #[error("Submission failed: {0}")]
    Submission(String),

    /// The edit targets something that no longer exists.
    #[error("{entity_type} no longer exists: {id}")]
    StaleReference {
        entity_type: &'static str,
        id: String,
    },
}

impl ClientError {
    pub fn validation(message: impl ToString) -> Self {
        Self::Validation(message.to_string())
    }

    pub fn submission(message: impl ToString) -> Self {
        Self::Submission(message.to_string())
    }

    pub fn stale(entity_type: &'static str, id: impl ToString) -> Self {
        Self::StaleReference {
            entity_type,
            id: id.to_string(),
        }
    }
}

impl From<StoreError> for ClientError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { entity_type, id } => Self::StaleReference { entity_type, id },
            other => Self::Submission(other.to_string()),
        }
    }
}

impl From<DomainError> for ClientError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::Validation(message) => Self::Validation(message),
            DomainError::NotFound { entity_type, id } => Self::StaleReference { entity_type, id },
        }
    }
}

/// Severity of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A transient, toast-style message for the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

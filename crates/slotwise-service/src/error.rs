//! The service error taxonomy.
//!
//! Validation and recurrence errors fail before any store work; storage
//! errors surface verbatim (the core never retries). Conflicts are not
//! errors — see [`crate::writer::CreateOutcome`].

use slotwise_engine::RuleError;
use slotwise_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// A field-level precondition failed. Maps to 400.
    #[error("validation failed on {field}: {message}")]
    Validation { field: String, message: String },

    /// The referenced resource does not exist. Maps to 404.
    #[error("resource {0} not found")]
    ResourceNotFound(Uuid),

    /// The recurrence rule text does not parse. Maps to 400.
    #[error("invalid recurrence rule: {0}")]
    InvalidRecurrence(String),

    /// Store unavailable, pool exhausted, or a transaction aborted for a
    /// reason other than the overlap exclusion. Maps to 500.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// The caller abandoned the request.
    #[error("request cancelled")]
    Cancelled,
}

impl ServiceError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<RuleError> for ServiceError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::InvalidRule(message) => Self::InvalidRecurrence(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

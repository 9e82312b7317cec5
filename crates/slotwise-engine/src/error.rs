//! Error types for engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleError {
    /// The recurrence rule text is empty or does not parse as RFC 5545.
    #[error("invalid recurrence rule: {0}")]
    InvalidRule(String),
}

pub type Result<T> = std::result::Result<T, RuleError>;

//! Error types for the store.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The insert was rejected by the `(resource_id, time_range)`
    /// exclusion constraint — the interval overlaps an existing row.
    #[error("booking overlaps an existing reservation")]
    Exclusion,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

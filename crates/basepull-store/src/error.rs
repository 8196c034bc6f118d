//! Error types for the staging store

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error type for staging-store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}. Check your connection settings.")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Staged record not found: {0}")]
    NotFound(String),

    #[error("Invalid download status: {0}")]
    InvalidStatus(String),
}

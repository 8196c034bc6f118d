//! Error types for the basepull CLI
//!
//! User-facing errors with enough context for the operator reading the daily
//! log to diagnose a failed run.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables or .env file.")]
    Config(String),

    /// Base-service API operation failed
    #[error(transparent)]
    Client(#[from] basepull_client::ClientError),

    /// Staging store operation failed
    #[error(transparent)]
    Store(#[from] basepull_store::StoreError),

    /// Shared utility failure (checksums, logging)
    #[error(transparent)]
    Common(#[from] basepull_common::CommonError),

    /// A downloaded attachment failed verification
    #[error("Download verification failed: {0}")]
    Download(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a download verification error
    pub fn download(msg: impl Into<String>) -> Self {
        Self::Download(msg.into())
    }
}

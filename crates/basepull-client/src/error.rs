//! Error types for the Base-service client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Error type for Base-service API operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("Network request failed: {0}. Check your connection and the service URL.")]
    Http(#[from] reqwest::Error),

    /// Credential exchange was rejected; fatal to the current run
    #[error("Authentication failed: {0}. Check the configured app id and secret.")]
    Auth(String),

    /// The cached bearer token was rejected with 401 and has been dropped
    #[error("Bearer token expired or revoked")]
    TokenExpired,

    /// The service answered with a non-zero application code
    #[error("Service error (code {code}): {msg}")]
    Api { code: i64, msg: String },

    /// Unexpected HTTP status outside the service envelope
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// The configured table URL does not carry an app token and table id
    #[error("Invalid table URL: {0}. Expected .../base/{{app_token}}?table={{table_id}}.")]
    InvalidTableUrl(String),

    /// A media download returned zero bytes
    #[error("Empty download for file token '{0}'")]
    EmptyDownload(String),

    /// Bounded retries were exhausted for one request
    #[error("Request failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// Whether a retry with the same inputs could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Http(_) => true,
            ClientError::TokenExpired => true,
            ClientError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

//! Error types for SwOS client operations

use thiserror::Error;

/// Result type alias for SwOS client operations
pub type Result<T> = std::result::Result<T, SwosClientError>;

/// Errors that can occur during SwOS client operations
#[derive(Error, Debug)]
pub enum SwosClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Device answered with a non-success status
    #[error("Device returned HTTP {status} for {endpoint}")]
    Status { status: u16, endpoint: String },

    /// Device answered with an empty or whitespace-only body
    #[error("Empty body from {0}")]
    EmptyBody(String),

    /// Digest challenge missing or unusable
    #[error("Digest authentication failed: {0}")]
    DigestAuth(String),

    /// Timeout
    #[error("Request timed out")]
    Timeout,

    /// Client was closed
    #[error("Client is closed")]
    Closed,

    /// Background request task failed
    #[error("Background request failed: {0}")]
    TaskFailed(String),

    /// Configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Every candidate endpoint of a section failed
    #[error("No responding endpoint for section {0}")]
    NoRespondingEndpoint(String),

    /// No section produced any data
    #[error("Device unavailable: no section returned data")]
    DeviceUnavailable,
}

impl SwosClientError {
    /// Create a status error for an endpoint
    pub fn status(status: u16, endpoint: impl Into<String>) -> Self {
        Self::Status {
            status,
            endpoint: endpoint.into(),
        }
    }
}

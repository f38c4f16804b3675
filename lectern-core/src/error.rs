//! Error types for Lectern Core

use thiserror::Error;

/// Result type alias using ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

/// Top-level error type for all client operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// No auth token, or the remote rejected it
    #[error("Not signed in")]
    Unauthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Remote error: {0}")]
    Remote(String),

    /// Corrupt local store contents; recovered locally, never shown to the user
    #[error("Malformed local data: {0}")]
    MalformedLocalData(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<GatewayError> for ClientError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unauthorized => ClientError::Unauthenticated,
            GatewayError::NotFound(what) => ClientError::NotFound(what),
            GatewayError::Remote(msg) => ClientError::Remote(msg),
        }
    }
}

/// Errors returned by a remote gateway call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Remote error: {0}")]
    Remote(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) => GatewayError::from_status(status, error.to_string()),
            None => GatewayError::Remote(error.to_string()),
        }
    }
}

impl GatewayError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: reqwest::StatusCode, detail: impl Into<String>) -> Self {
        use reqwest::StatusCode;

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Unauthorized,
            StatusCode::NOT_FOUND => GatewayError::NotFound(detail.into()),
            _ => GatewayError::Remote(format!("{}: {}", status, detail.into())),
        }
    }
}

/// Errors that occur during local store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

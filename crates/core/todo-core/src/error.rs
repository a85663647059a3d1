//! Error types, one enum per layer.

use thiserror::Error;

pub type TransportResult<T> = Result<T, TransportError>;
pub type ApiResult<T> = Result<T, ApiError>;
pub type TodoResult<T> = Result<T, TodoError>;
pub type StoreResult<T> = Result<T, StoreError>;

/// The request never produced an HTTP response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header value for {0}")]
    InvalidHeader(String),
}

/// Outcome of a remote call, classified once at the adapter boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Not authorized")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Rejected by server: {0}")]
    Rejected(String),

    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ApiError {
    /// True when no response was received at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Login rejected: {0}")]
    LoginRejected(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

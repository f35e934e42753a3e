use thiserror::Error;

#[derive(Error, Debug)]
pub enum CertAuthError {
    /// Caller-supplied data violates an entry invariant. The message is
    /// surfaced to the caller verbatim.
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unsupported operation {operation} on path {path}")]
    UnsupportedOperation { operation: String, path: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CertAuthError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        CertAuthError::InvalidArgument(message.into())
    }

    /// True for errors caused by the request itself rather than the backend.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            CertAuthError::InvalidArgument(_) | CertAuthError::InvalidRequest(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CertAuthError>;

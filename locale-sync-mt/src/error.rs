use locale_sync::DocumentError;
use thiserror::Error;

/// Error types for translation and synchronization
#[derive(Debug, Error)]
pub enum MtError {
    /// The backend throttled us, or a request ran past its timeout
    #[error("Rate limited: {0}")]
    RateLimited(String),
    /// Any other transport, protocol or response-shape failure
    #[error("Backend error: {0}")]
    BackendError(String),
    /// A required setting is missing or invalid
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    /// The run was cancelled while a request was in flight
    #[error("Cancelled")]
    Cancelled,
    /// Reading, flattening or writing a locale document failed
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MtError::RateLimited(format!("request timed out: {}", err))
        } else if err.status().is_some_and(|s| s.as_u16() == 429) {
            MtError::RateLimited(err.to_string())
        } else {
            MtError::BackendError(err.to_string())
        }
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;

//! Error types for the sync engine.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while synchronizing a domain.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// The device or backend was unreachable.
    #[error("network error: {0}")]
    Network(String),

    /// A fetch exceeded its deadline. Treated as network-class.
    #[error("request timed out")]
    Timeout,

    /// The backend answered with a non-success status.
    #[error("server error: status {status}")]
    Server {
        /// HTTP status code of the response.
        status: u16,
    },

    /// The response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// The caller passed an invalid domain or configuration.
    ///
    /// Fatal: surfaces immediately and is never retried.
    #[error("validation error: {0}")]
    Validation(String),

    /// The operation was cancelled by engine disposal.
    ///
    /// Internal: never surfaces through the consumer-facing API.
    #[error("cancelled")]
    Cancelled,
}

impl SyncError {
    /// Returns true if a fetch that failed with this error may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::Network(_) | SyncError::Timeout | SyncError::Server { .. } | SyncError::Parse(_)
        )
    }

    /// Returns true for network-class failures (unreachable or timed out).
    pub fn is_network_class(&self) -> bool {
        matches!(self, SyncError::Network(_) | SyncError::Timeout)
    }

    /// Returns true when the backend itself produced a response.
    ///
    /// Server and parse failures prove the server is reachable; network and
    /// timeout failures do not.
    pub fn backend_responded(&self) -> bool {
        matches!(self, SyncError::Server { .. } | SyncError::Parse(_))
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Parse(err.to_string())
    }
}

impl From<opsboard_domain::UnknownDomain> for SyncError {
    fn from(err: opsboard_domain::UnknownDomain) -> Self {
        SyncError::Validation(err.to_string())
    }
}

//! Error types for provider calls

use thiserror::Error;

/// Result type alias for fetch operations
pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors raised while talking to the stats provider
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status
    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },

    /// The body did not have the expected shape
    #[error("Failed to decode {endpoint} response: {reason}")]
    Decode { endpoint: String, reason: String },

    /// A named table was missing from a stats response
    #[error("{endpoint} response has no result set named {name}")]
    MissingResultSet { endpoint: String, name: String },
}

impl FetchError {
    pub fn status(endpoint: impl Into<String>, status: u16) -> Self {
        Self::Status { endpoint: endpoint.into(), status }
    }

    pub fn decode(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode { endpoint: endpoint.into(), reason: reason.into() }
    }

    pub fn missing_result_set(endpoint: impl Into<String>, name: impl Into<String>) -> Self {
        Self::MissingResultSet { endpoint: endpoint.into(), name: name.into() }
    }

    /// Whether another attempt could succeed
    ///
    /// Timeouts, connection failures, throttling and server errors are
    /// transient. A body we cannot decode will not change on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Decode { .. } | FetchError::MissingResultSet { .. } => false,
        }
    }
}

//! Error types shared across the client.
//!
//! One top-level enum covers every failure the library can surface. The
//! response cache has no error variant: an absent or expired entry is a
//! normal miss, never a failure.

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered, but the envelope reported failure.
    #[error("API error: {0}")]
    Api(String),

    #[error("Unexpected response: {0}")]
    Data(String),

    #[error("Rate limit exceeded for {endpoint}")]
    RateLimit { endpoint: String },

    /// The authorization window could not be opened at all. Reported
    /// immediately and distinctly from a timeout so the caller can show an
    /// actionable message instead of silently retrying.
    #[error("Authorization window blocked: {0}")]
    PopupBlocked(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Transient failures that a retry loop may absorb without surfacing.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClientError::Network(_) | ClientError::RateLimit { .. }
        )
    }
}

//! Error types for Model Manager operations.

use thiserror::Error;

/// Result type alias for Model Manager operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised by the Model Manager client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No credentials are stored; `connect` has not succeeded yet.
    #[error("Not connected to Model Manager; call connect first")]
    NotConnected,

    /// `connect` was called with an empty URL.
    #[error("API URL is required")]
    MissingApiUrl,

    /// `connect` was called with an empty key.
    #[error("API key is required")]
    MissingApiKey,

    /// The service rejected the key (HTTP 401).
    #[error("Invalid or expired API key")]
    InvalidApiKey,

    /// The key lacks permission for the operation (HTTP 403).
    #[error("Access denied")]
    AccessDenied,

    /// The service answered with a non-success status.
    #[error("API request failed with status {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Parsed `error` field, or the raw body text
        message: String,
    },

    /// Connection failure or timeout before any HTTP status was received.
    #[error("Network error: {message}")]
    Network {
        /// Description of the transport problem
        message: String,
    },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The service returned a body that could not be parsed.
    #[error("Invalid response from Model Manager: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    /// Cache filesystem failure.
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A folder name did not map to a known category.
    #[error(transparent)]
    UnknownCategory(#[from] modman_core::UnknownCategory),
}

impl ClientError {
    /// Whether this is an authentication failure. Callers should prompt for
    /// a fresh connect rather than retry.
    pub const fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::NotConnected
                | Self::MissingApiUrl
                | Self::MissingApiKey
                | Self::InvalidApiKey
                | Self::AccessDenied
        )
    }

    /// HTTP status code, when the failure carries one.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::InvalidApiKey => Some(401),
            Self::AccessDenied => Some(403),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            format!("request timed out: {e}")
        } else {
            e.to_string()
        };
        Self::Network { message }
    }
}

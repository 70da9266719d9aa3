//! Error types and Result alias for the Jifeng clients

use thiserror::Error;

/// Main error type shared by every client crate.
///
/// This is the service-level error: transport failures, non-success
/// responses, and unreadable payloads all surface through it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// The backend rejected the bearer credential (HTTP 401 or envelope code 401)
    #[error("Session expired: {0}")]
    TokenExpired(String),

    /// The backend answered with a non-success code and a message
    #[error("API request failed ({code}): {message}")]
    ApiError { code: i32, message: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Encryption error: {0}")]
    EncryptionError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// The message the backend attached to a failed call, if any.
    ///
    /// Falls back to the display text for locally produced errors so
    /// callers always have something to show.
    pub fn server_message(&self) -> String {
        match self {
            Error::ApiError { message, .. } => message.clone(),
            Error::TokenExpired(message) | Error::AuthenticationError(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidData(err.to_string())
    }
}

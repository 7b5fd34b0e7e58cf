//! Error types for speech AI operations.

use std::fmt;

/// Provider-agnostic error type.
///
/// Provider implementations map their native failures onto these variants so
/// callers can decide between retrying, re-authenticating and giving up without
/// knowing which vendor is behind the trait.
#[derive(Debug)]
pub enum Error {
    /// Credentials are missing, invalid or lack permission.
    Authentication(String),

    /// Connectivity failure; usually transient.
    Network(String),

    /// Invalid parameters or missing configuration.
    Configuration(String),

    /// The provider accepted the request but reported a failure.
    Provider(String),

    /// Requested transcription does not exist.
    NotFound(String),

    /// Provider rate limit exceeded.
    RateLimited { retry_after_seconds: u64 },

    /// Response body did not match the expected shape.
    Deserialization(String),

    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Provider(msg) => write!(f, "Provider error: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::RateLimited {
                retry_after_seconds,
            } => {
                write!(f, "Rate limited: retry after {}s", retry_after_seconds)
            }
            Error::Deserialization(msg) => write!(f, "Deserialization error: {}", msg),
            Error::Other(err) => write!(f, "Other error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Deserialization(err.to_string())
    }
}

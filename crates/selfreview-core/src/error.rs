//! Error types for selfreview.

use thiserror::Error;

/// Main error type for selfreview operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or unreadable configuration (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pull request URL could not be resolved to owner/repo/number
    #[error("Invalid pull request URL '{url}': {reason}")]
    InvalidPrUrl { url: String, reason: String },

    /// HTTP transport failed (connection, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Credential rejected by the remote API
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (permissions, locked PR)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Remote resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote API rate limit hit
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// API returned an error
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Remote response could not be decoded
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Tool arguments missing or malformed
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Tool name not registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure of a named operation, wrapping the underlying error
    #[error("{operation}: {source}")]
    Operation {
        operation: String,
        #[source]
        source: Box<Error>,
    },

    /// Reading or writing the protocol stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Map an HTTP error status and response body to an error.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => Error::Unauthorized(message),
            403 if is_rate_limit_message(&message) => Error::RateLimited(message),
            403 => Error::Forbidden(message),
            404 => Error::NotFound(message),
            429 => Error::RateLimited(message),
            _ => Error::Api { status, message },
        }
    }

    /// Prefix this error with the operation that failed.
    pub fn context(self, operation: impl Into<String>) -> Self {
        Error::Operation {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through operation context.
    pub fn root(&self) -> &Error {
        match self {
            Error::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether this error originated from the remote API or the network.
    pub fn is_remote(&self) -> bool {
        matches!(
            self.root(),
            Error::Http(_)
                | Error::Unauthorized(_)
                | Error::Forbidden(_)
                | Error::NotFound(_)
                | Error::RateLimited(_)
                | Error::Api { .. }
                | Error::InvalidData(_)
        )
    }
}

/// GitHub answers exhausted primary rate limits with 403 rather than 429.
fn is_rate_limit_message(message: &str) -> bool {
    message.to_ascii_lowercase().contains("rate limit")
}

/// Result type alias for selfreview operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Error definitions shared by the codec, pipeline and façade.

use std::time::Duration;

use reqwest::Method;
use thiserror::Error;

/// Coarse classification of an [`HttpError`], used for logging, metrics and
/// retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    HttpStatus,
    Timeout,
    CircuitOpen,
    UnsupportedFormat,
    Serialization,
    Deserialization,
    Configuration,
}

impl ErrorKind {
    /// Stable label for logs and metric dimensions.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::HttpStatus => "http_status",
            ErrorKind::Timeout => "timeout",
            ErrorKind::CircuitOpen => "circuit_open",
            ErrorKind::UnsupportedFormat => "unsupported_format",
            ErrorKind::Serialization => "serialization",
            ErrorKind::Deserialization => "deserialization",
            ErrorKind::Configuration => "configuration",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the request layer.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network or connection failure reported by the transport.
    #[error("{method} {url}: transport error: {reason}")]
    Transport {
        method: Method,
        url: String,
        reason: String,
    },

    /// The server answered with a non-2xx status.
    #[error("{method} {url}: server returned status {status}")]
    HttpStatus {
        method: Method,
        url: String,
        status: u16,
        body: String,
    },

    /// The whole pipeline (all attempts and delays) exceeded its deadline.
    #[error("{method} {url}: timed out after {}ms", elapsed.as_millis())]
    Timeout {
        method: Method,
        url: String,
        elapsed: Duration,
    },

    /// The circuit breaker rejected the call without contacting the server.
    #[error("{method} {url}: circuit open, retry after {}ms", retry_after.as_millis())]
    CircuitOpen {
        method: Method,
        url: String,
        retry_after: Duration,
    },

    /// Format tag is not one of the supported codecs for this direction.
    #[error("Unsupported format '{0}'")]
    UnsupportedFormat(String),

    /// Request body could not be encoded.
    #[error("Failed to serialize {format} body: {reason}")]
    Serialization { format: &'static str, reason: String },

    /// Response body did not match the requested shape.
    #[error("Failed to deserialize {format} body: {reason}")]
    Deserialization { format: &'static str, reason: String },

    /// Caller or configuration mistake (unknown client, conflicting auth, bad header).
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl HttpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HttpError::Transport { .. } => ErrorKind::Transport,
            HttpError::HttpStatus { .. } => ErrorKind::HttpStatus,
            HttpError::Timeout { .. } => ErrorKind::Timeout,
            HttpError::CircuitOpen { .. } => ErrorKind::CircuitOpen,
            HttpError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            HttpError::Serialization { .. } => ErrorKind::Serialization,
            HttpError::Deserialization { .. } => ErrorKind::Deserialization,
            HttpError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Transient failures that the retry policy may absorb.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Transport | ErrorKind::HttpStatus | ErrorKind::CircuitOpen
        )
    }

    /// Status code for [`HttpError::HttpStatus`].
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for request-layer operations.
pub type HttpResult<T> = Result<T, HttpError>;

//! Error types for estatedesk.
//!
//! A single [`Error`] covers transport, authentication, protocol, storage and
//! input validation failures. Every variant is `Clone` so one renewal failure
//! can be handed to every caller that was waiting on it.

use std::fmt;
use thiserror::Error;

/// HTTP status the API uses for a missing, expired or invalid credential.
pub const UNAUTHENTICATED_STATUS: u16 = 401;

/// The unified error type for estatedesk operations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (invalid credentials, failed renewal).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Non-2xx replies from the API.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Credential store failures.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Input validation errors (bad URL, bad path).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns the protocol error if this is a non-2xx reply.
    pub fn as_protocol(&self) -> Option<&ProtocolError> {
        match self {
            Error::Protocol(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the HTTP status of a protocol error.
    pub fn status(&self) -> Option<u16> {
        self.as_protocol().map(|err| err.status)
    }

    /// Check if this is a 401 reply.
    pub fn is_unauthenticated(&self) -> bool {
        self.status() == Some(UNAUTHENTICATED_STATUS)
    }
}

/// Transport-level errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Response body could not be decoded.
    #[error("failed to decode response: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The login endpoint rejected the supplied credentials.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The renewal endpoint answered 2xx without a usable token.
    #[error("renewal response did not contain a token")]
    MissingToken,

    /// Session renewal failed; wraps the renewal call's own error.
    #[error("session renewal failed: {0}")]
    RenewalFailed(Box<Error>),

    /// The task driving a renewal was dropped before it settled.
    #[error("session renewal was abandoned")]
    RenewalAbandoned,
}

/// A non-2xx reply from the API.
#[derive(Debug, Clone)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code, if the body carried one.
    pub error: Option<String>,
    /// Human-readable message, if the body carried one.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// Check if this reply means the credential was rejected.
    pub fn is_unauthenticated(&self) -> bool {
        self.status == UNAUTHENTICATED_STATUS
    }
}

/// Credential store errors.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// Stored data could not be parsed.
    #[error("corrupt credential file {path}: {message}")]
    Corrupt { path: String, message: String },

    /// The in-memory store's lock was poisoned by a panicking writer.
    #[error("credential store lock poisoned")]
    Poisoned,
}

/// Input validation errors.
#[derive(Debug, Clone, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid request path.
    #[error("invalid path '{value}': {reason}")]
    Path { value: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::new(
            401,
            Some("TokenExpired".to_string()),
            Some("jwt expired".to_string()),
        );
        assert_eq!(err.to_string(), "HTTP 401 [TokenExpired]: jwt expired");

        let bare = ProtocolError::new(500, None, None);
        assert_eq!(bare.to_string(), "HTTP 500");
    }

    #[test]
    fn unauthenticated_detection() {
        let err = Error::Protocol(ProtocolError::new(401, None, None));
        assert!(err.is_unauthenticated());
        assert_eq!(err.status(), Some(401));

        let forbidden = Error::Protocol(ProtocolError::new(403, None, None));
        assert!(!forbidden.is_unauthenticated());

        let transport = Error::Transport(TransportError::Timeout { duration_ms: 10 });
        assert!(!transport.is_unauthenticated());
        assert_eq!(transport.status(), None);
    }

    #[test]
    fn renewal_failure_wraps_cause() {
        let cause = Error::Protocol(ProtocolError::new(403, None, Some("revoked".into())));
        let err = Error::Auth(AuthError::RenewalFailed(Box::new(cause)));
        let text = err.to_string();
        assert!(text.contains("session renewal failed"));
        assert!(text.contains("HTTP 403"));
        // The wrapper itself is not a 401, so nothing upstream will try to renew it.
        assert!(!err.is_unauthenticated());
    }
}

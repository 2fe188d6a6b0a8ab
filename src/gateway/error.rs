//! Error type shared by the gateway and blob transfer.

use thiserror::Error;

/// Raised when a remote call fails. Never retried by this crate.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TransportError {
    /// The request could not be sent or the connection failed.
    #[error("{operation} request failed: {message}")]
    Request {
        /// Remote operation being attempted.
        operation: String,
        /// Underlying client error message.
        message: String,
    },
    /// The remote side answered with a non-success status.
    #[error("{operation} returned HTTP {status}: {body}")]
    Status {
        /// Remote operation being attempted.
        operation: String,
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },
    /// The response body could not be decoded.
    #[error("failed to decode {operation} response: {message}")]
    Decode {
        /// Remote operation being attempted.
        operation: String,
        /// Decoder error message.
        message: String,
    },
}

impl TransportError {
    /// Builds a [`TransportError::Request`] for `operation`.
    #[must_use]
    pub fn request(operation: impl Into<String>, message: &impl ToString) -> Self {
        Self::Request {
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}

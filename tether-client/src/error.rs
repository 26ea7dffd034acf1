//! Error types for the tether client.

use tether_core::ErrorCode;
use tether_membership::FatalError;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned to the application by `GroupConsumer`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The membership failed permanently.
    #[error(transparent)]
    Fatal(#[from] FatalError),

    /// The consumer was closed.
    #[error("consumer is closed")]
    Closed,

    /// The operation is not permitted in the current state.
    #[error("{0}")]
    InvalidState(tether_core::Error),

    /// An argument was rejected.
    #[error("{0}")]
    InvalidArgument(tether_core::Error),

    /// The configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(tether_core::Error),

    /// The background driver is no longer running.
    #[error("membership driver stopped")]
    DriverGone,
}

impl ClientError {
    /// Wraps an error returned by the membership engine for a request.
    #[must_use]
    pub const fn rejected(err: tether_core::Error) -> Self {
        match err {
            tether_core::Error::InvalidState { .. } => Self::InvalidState(err),
            _ => Self::InvalidArgument(err),
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised while exchanging a heartbeat with the coordinator.
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The exchange did not complete in time.
    #[error("heartbeat timed out after {after_ms}ms")]
    Timeout {
        /// The timeout that elapsed.
        after_ms: u64,
    },

    /// The request could not be encoded.
    #[error("protocol encode error: {message}")]
    Encode {
        /// What went wrong.
        message: String,
    },

    /// The response could not be decoded.
    #[error("protocol decode error: {message}")]
    Decode {
        /// What went wrong.
        message: String,
    },

    /// A topic name has no known topic id.
    #[error("unknown topic: {topic}")]
    UnknownTopic {
        /// The topic name.
        topic: String,
    },

    /// A topic id has no known topic name.
    #[error("unknown topic id: {topic_id}")]
    UnknownTopicId {
        /// The topic id.
        topic_id: Uuid,
    },

    /// A frame announced more bytes than this client accepts.
    #[error("frame of {size} bytes exceeds limit of {max} bytes")]
    FrameTooLarge {
        /// Announced frame size.
        size: usize,
        /// Accepted maximum.
        max: usize,
    },

    /// The coordinator closed the connection.
    #[error("connection closed")]
    ConnectionClosed,

    /// The response answered a different request.
    #[error("correlation id mismatch: expected {expected}, got {actual}")]
    CorrelationMismatch {
        /// Correlation id of the request.
        expected: i32,
        /// Correlation id of the response.
        actual: i32,
    },
}

impl TransportError {
    /// Maps the failure onto a client-local error code for classification.
    ///
    /// Network trouble is retriable. A request this client cannot even build
    /// is fatal.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Io(_)
            | Self::Decode { .. }
            | Self::UnknownTopicId { .. }
            | Self::FrameTooLarge { .. }
            | Self::ConnectionClosed
            | Self::CorrelationMismatch { .. } => ErrorCode::Transport,
            Self::Timeout { .. } => ErrorCode::TimedOut,
            Self::Encode { .. } | Self::UnknownTopic { .. } => ErrorCode::InvalidRequest,
        }
    }

    /// Create a decode error from any error type.
    pub fn decode<E: std::fmt::Display>(err: E) -> Self {
        Self::Decode {
            message: err.to_string(),
        }
    }

    /// Create an encode error from any error type.
    pub fn encode<E: std::fmt::Display>(err: E) -> Self {
        Self::Encode {
            message: err.to_string(),
        }
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

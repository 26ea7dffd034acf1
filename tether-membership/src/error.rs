//! Terminal membership error.

use tether_core::ErrorCode;
use thiserror::Error;

/// A fatal membership condition.
///
/// Raised once per membership when the coordinator returns an error that
/// cannot be recovered locally. Heartbeats stop permanently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fatal consumer group error: {code}: {message}")]
pub struct FatalError {
    /// The error code that caused the failure.
    pub code: ErrorCode,
    /// Coordinator-supplied message, or the code name when none was given.
    pub message: String,
}

impl FatalError {
    /// Creates a fatal error, falling back to the code name for the message.
    #[must_use]
    pub fn new(code: ErrorCode, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| code.name().to_string());
        Self { code, message }
    }
}

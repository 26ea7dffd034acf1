//! Error types for tether core operations.
//!
//! All errors are handled explicitly. Protocol error codes returned by the
//! group coordinator are not errors of this kind; they are `ErrorCode`s and
//! are classified by the membership engine.

use thiserror::Error;

/// The result type for tether core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised when validating arguments and configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A resource limit was exceeded.
    #[error("limit exceeded: {limit} (max={max}, actual={actual})")]
    LimitExceeded {
        /// Which limit was exceeded.
        limit: &'static str,
        /// The maximum allowed value.
        max: u64,
        /// The actual value that exceeded the limit.
        actual: u64,
    },

    /// An invalid argument was provided.
    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// The name of the argument.
        name: &'static str,
        /// Why it was invalid.
        reason: &'static str,
    },

    /// The operation is not permitted in the current state.
    #[error("invalid state: in {current}, need {required}")]
    InvalidState {
        /// The current state.
        current: &'static str,
        /// The required state for this operation.
        required: &'static str,
    },
}

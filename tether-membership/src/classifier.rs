//! Error classification.
//!
//! Every error code maps to exactly one handling category. The table is a
//! single match without a wildcard over named codes, so a new `ErrorCode`
//! variant does not compile until it is classified. Codes without a name
//! fail closed.

use std::fmt;

use tether_core::ErrorCode;

/// How the state machine handles an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Not an error.
    Ignorable,
    /// Transient; retried transparently.
    Retriable,
    /// The coordinator no longer recognizes this member; rejoin.
    Fenced,
    /// Unrecoverable; heartbeats stop.
    Fatal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ignorable => "ignorable",
            Self::Retriable => "retriable",
            Self::Fenced => "fenced",
            Self::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

/// Classifies an error code.
#[must_use]
pub const fn classify(code: ErrorCode) -> ErrorCategory {
    match code {
        ErrorCode::None => ErrorCategory::Ignorable,

        ErrorCode::UnknownMemberId | ErrorCode::FencedMemberEpoch => ErrorCategory::Fenced,

        ErrorCode::CoordinatorLoadInProgress
        | ErrorCode::CoordinatorNotAvailable
        | ErrorCode::NotCoordinator
        | ErrorCode::RequestTimedOut
        | ErrorCode::NetworkException
        | ErrorCode::ThrottlingQuotaExceeded
        | ErrorCode::Transport
        | ErrorCode::Ssl
        | ErrorCode::TimedOut
        | ErrorCode::TimedOutQueue => ErrorCategory::Retriable,

        ErrorCode::InvalidRequest
        | ErrorCode::GroupMaxSizeReached
        | ErrorCode::UnsupportedAssignor
        | ErrorCode::UnsupportedVersion
        | ErrorCode::UnreleasedInstanceId
        | ErrorCode::GroupAuthorizationFailed
        | ErrorCode::TopicAuthorizationFailed
        | ErrorCode::InvalidGroupId
        | ErrorCode::UnknownServerError
        | ErrorCode::Unknown(_) => ErrorCategory::Fatal,
    }
}

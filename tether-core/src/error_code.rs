//! Protocol and client-local error codes.
//!
//! Codes returned by the group coordinator use the Kafka protocol numbering
//! (see <https://kafka.apache.org/protocol#protocol_error_codes>). Conditions
//! detected locally by the client (transport failure, queue timeout) use the
//! reserved negative range below -100 so they can travel through the same
//! classification path as broker errors.

use std::fmt;

/// Generates `ErrorCode` together with its code and name tables so the
/// three can never drift apart.
macro_rules! define_error_codes {
    ($( $(#[$doc:meta])* $variant:ident = $code:literal => $name:literal, )*) => {
        /// An error code carried by a heartbeat response or raised locally.
        ///
        /// Conversion from `i16` is total: codes without a named variant map
        /// to `Unknown`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ErrorCode {
            $( $(#[$doc])* $variant, )*
            /// A code this client has no name for.
            Unknown(i16),
        }

        impl ErrorCode {
            /// Every named error code, in declaration order.
            pub const ALL: &'static [Self] = &[$( Self::$variant, )*];

            /// Maps a raw code to its variant.
            #[must_use]
            pub const fn from_code(code: i16) -> Self {
                match code {
                    $( $code => Self::$variant, )*
                    other => Self::Unknown(other),
                }
            }

            /// Returns the raw code.
            #[must_use]
            pub const fn code(self) -> i16 {
                match self {
                    $( Self::$variant => $code, )*
                    Self::Unknown(code) => code,
                }
            }

            /// Returns the canonical upper-case name.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )*
                    Self::Unknown(_) => "UNKNOWN",
                }
            }
        }
    };
}

define_error_codes! {
    /// No error.
    None = 0 => "NONE",
    /// The server experienced an unexpected error.
    UnknownServerError = -1 => "UNKNOWN_SERVER_ERROR",
    /// The request timed out on the broker.
    RequestTimedOut = 7 => "REQUEST_TIMED_OUT",
    /// The server disconnected before a response was received.
    NetworkException = 13 => "NETWORK_EXCEPTION",
    /// The coordinator is loading and hence can't process requests.
    CoordinatorLoadInProgress = 14 => "COORDINATOR_LOAD_IN_PROGRESS",
    /// The coordinator is not available.
    CoordinatorNotAvailable = 15 => "COORDINATOR_NOT_AVAILABLE",
    /// This is not the correct coordinator.
    NotCoordinator = 16 => "NOT_COORDINATOR",
    /// The configured group id is invalid.
    InvalidGroupId = 24 => "INVALID_GROUP_ID",
    /// The coordinator is not aware of this member.
    UnknownMemberId = 25 => "UNKNOWN_MEMBER_ID",
    /// Topic authorization failed.
    TopicAuthorizationFailed = 29 => "TOPIC_AUTHORIZATION_FAILED",
    /// Group authorization failed.
    GroupAuthorizationFailed = 30 => "GROUP_AUTHORIZATION_FAILED",
    /// The version of the API is not supported.
    UnsupportedVersion = 35 => "UNSUPPORTED_VERSION",
    /// The request was malformed.
    InvalidRequest = 42 => "INVALID_REQUEST",
    /// The group has reached its maximum size.
    GroupMaxSizeReached = 81 => "GROUP_MAX_SIZE_REACHED",
    /// The request was throttled by a quota.
    ThrottlingQuotaExceeded = 89 => "THROTTLING_QUOTA_EXCEEDED",
    /// The member epoch is fenced by the group coordinator.
    FencedMemberEpoch = 110 => "FENCED_MEMBER_EPOCH",
    /// The instance id is still used by another member.
    UnreleasedInstanceId = 111 => "UNRELEASED_INSTANCE_ID",
    /// The assignor is not supported by the coordinator.
    UnsupportedAssignor = 112 => "UNSUPPORTED_ASSIGNOR",
    /// Local: the request timed out while still queued for transmission.
    TimedOutQueue = -166 => "_TIMED_OUT_QUEUE",
    /// Local: TLS handshake or session failure.
    Ssl = -181 => "_SSL",
    /// Local: the exchange did not complete in time.
    TimedOut = -185 => "_TIMED_OUT",
    /// Local: broker transport failure.
    Transport = -195 => "_TRANSPORT",
}

impl ErrorCode {
    /// Returns true if this is the no-error code.
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns true if the condition was raised by the client, not the coordinator.
    #[must_use]
    pub const fn is_local(self) -> bool {
        self.code() < -100
    }
}

impl Default for ErrorCode {
    fn default() -> Self {
        Self::None
    }
}

impl From<i16> for ErrorCode {
    fn from(code: i16) -> Self {
        Self::from_code(code)
    }
}

impl From<ErrorCode> for i16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "UNKNOWN({code})"),
            _ => write!(f, "{}({})", self.name(), self.code()),
        }
    }
}

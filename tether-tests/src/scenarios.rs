//! Reusable test scenarios for membership tests.
//!
//! Error-code groups follow the classification table. The heartbeat error
//! tests run every code of every group under each variation.

/// Error codes grouped by how the membership must react.
pub mod codes {
    use tether_core::ErrorCode;

    /// Codes that fail the membership permanently.
    pub const FATAL: &[ErrorCode] = &[
        ErrorCode::InvalidRequest,
        ErrorCode::GroupMaxSizeReached,
        ErrorCode::UnsupportedAssignor,
        ErrorCode::UnsupportedVersion,
        ErrorCode::UnreleasedInstanceId,
        ErrorCode::GroupAuthorizationFailed,
        ErrorCode::TopicAuthorizationFailed,
        ErrorCode::InvalidGroupId,
        ErrorCode::UnknownServerError,
    ];

    /// Codes retried transparently.
    pub const RETRIABLE: &[ErrorCode] = &[
        ErrorCode::CoordinatorLoadInProgress,
        ErrorCode::CoordinatorNotAvailable,
        ErrorCode::NotCoordinator,
        ErrorCode::RequestTimedOut,
        ErrorCode::NetworkException,
        ErrorCode::ThrottlingQuotaExceeded,
        ErrorCode::Transport,
        ErrorCode::Ssl,
        ErrorCode::TimedOut,
        ErrorCode::TimedOutQueue,
    ];

    /// Codes that fence the member and force a rejoin.
    pub const FENCED: &[ErrorCode] = &[ErrorCode::UnknownMemberId, ErrorCode::FencedMemberEpoch];
}

/// When the injected error hits.
pub mod variations {
    /// The first heartbeat (the join) fails.
    pub const FIRST_HEARTBEAT: u32 = 0;

    /// The join succeeds with an assignment; the next heartbeat fails.
    pub const SECOND_HEARTBEAT: u32 = 1;

    /// Every variation.
    pub const ALL: &[u32] = &[FIRST_HEARTBEAT, SECOND_HEARTBEAT];
}

/// Seeds for reproducible testing.
pub mod seeds {
    /// Standard test seeds that have historically found bugs.
    pub const REGRESSION_SEEDS: &[u64] = &[
        42,
        12345,
        0xDEAD_BEEF,
        999,
        7777,
        0x1337,
        0xCAFE_BABE,
        1,
        u64::MAX,
        0,
    ];

    /// Number of random seeds to test in CI.
    pub const CI_SEED_COUNT: u32 = 100;
}

#[cfg(test)]
mod tests {
    use tether_core::ErrorCode;
    use tether_membership::{classify, ErrorCategory};

    use super::codes;

    #[test]
    fn test_code_groups_match_classification() {
        for code in codes::FATAL {
            assert_eq!(classify(*code), ErrorCategory::Fatal, "{code}");
        }
        for code in codes::RETRIABLE {
            assert_eq!(classify(*code), ErrorCategory::Retriable, "{code}");
        }
        for code in codes::FENCED {
            assert_eq!(classify(*code), ErrorCategory::Fenced, "{code}");
        }
    }

    #[test]
    fn test_code_groups_cover_every_error() {
        let grouped = codes::FATAL.len() + codes::RETRIABLE.len() + codes::FENCED.len();
        // Everything except NONE.
        assert_eq!(grouped, ErrorCode::ALL.len() - 1);
    }
}

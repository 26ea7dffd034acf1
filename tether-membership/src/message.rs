//! Logical heartbeat messages.
//!
//! These carry the fields of `ConsumerGroupHeartbeat` the membership engine
//! reads or writes. Wire encoding lives in the runtime crate.

use tether_core::{ErrorCode, GroupId, MemberEpoch, MemberId, PartitionSet};

/// A heartbeat request built by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatRequest {
    /// The group.
    pub group_id: GroupId,
    /// Member id, empty on the first join.
    pub member_id: MemberId,
    /// `JOIN` to (re)join, `LEAVE` to leave, otherwise the current epoch.
    pub member_epoch: MemberEpoch,
    /// Subscribed topics, sent on (re)join or after the subscription changed.
    pub subscribed_topics: Option<Vec<String>>,
    /// Owned partitions, sent on (re)join or after the owned set changed.
    pub owned_partitions: Option<PartitionSet>,
    /// Rebalance timeout.
    pub rebalance_timeout_ms: u64,
    /// Static membership instance id.
    pub instance_id: Option<String>,
    /// Rack id.
    pub rack_id: Option<String>,
    /// Server-side assignor.
    pub server_assignor: Option<String>,
}

impl HeartbeatRequest {
    /// Returns true if this request (re)joins the group.
    #[must_use]
    pub const fn is_join(&self) -> bool {
        self.member_epoch.is_join()
    }

    /// Returns true if this is the leave-group heartbeat.
    #[must_use]
    pub const fn is_leave(&self) -> bool {
        self.member_epoch.is_leave()
    }
}

/// A heartbeat response, or a transport failure expressed as one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeartbeatResponse {
    /// Error code, `NONE` on success.
    pub error_code: ErrorCode,
    /// Optional error message.
    pub error_message: Option<String>,
    /// Member id assigned by the coordinator.
    pub member_id: Option<MemberId>,
    /// Epoch to use from now on.
    pub member_epoch: MemberEpoch,
    /// Heartbeat interval requested by the coordinator.
    pub heartbeat_interval_ms: Option<u64>,
    /// Target assignment. `None` means unchanged.
    pub assignment: Option<PartitionSet>,
}

impl HeartbeatResponse {
    /// Creates a successful response.
    #[must_use]
    pub fn ok(member_id: impl Into<MemberId>, member_epoch: MemberEpoch) -> Self {
        Self {
            member_id: Some(member_id.into()),
            member_epoch,
            ..Self::default()
        }
    }

    /// Creates an error response.
    #[must_use]
    pub fn error(code: ErrorCode) -> Self {
        Self {
            error_code: code,
            ..Self::default()
        }
    }

    /// Sets the error message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Sets the target assignment.
    #[must_use]
    pub fn with_assignment(mut self, assignment: PartitionSet) -> Self {
        self.assignment = Some(assignment);
        self
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub const fn with_heartbeat_interval_ms(mut self, ms: u64) -> Self {
        self.heartbeat_interval_ms = Some(ms);
        self
    }
}

/// A retriable condition reported for observability only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The error that was retried.
    pub code: ErrorCode,
    /// Optional message.
    pub message: Option<String>,
    /// Consecutive retriable failures so far.
    pub attempt: u32,
    /// Delay until the retry.
    pub retry_in_ms: u64,
    /// When the error was observed.
    pub at_ms: u64,
}

//! Tether Membership - Consumer group membership state machine.
//!
//! This crate implements the client side of the `ConsumerGroupHeartbeat`
//! protocol: joining a group, keeping the membership alive with periodic
//! heartbeats, reconciling partition assignments, recovering from fencing and
//! leaving the group.
//!
//! The state machine is sans-IO. Every operation takes the current time as an
//! explicit `now_ms` argument and returns the actions the caller must perform
//! (send a heartbeat, publish a diagnostic, report completion). A runtime
//! drives it; tests drive it directly with a virtual clock.
//!
//! # Design Principles
//!
//! - **Fail closed**: unrecognized error codes are fatal
//! - **One event per call**: at most one rebalance event leaves the machine per poll or close
//! - **Acknowledged assignment**: the owned set changes only once the application acknowledges an event
//! - **No unsafe code**

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod assignment;
mod classifier;
mod config;
mod error;
mod message;
mod rebalance;
mod scheduler;
mod state;

pub use assignment::{AssignmentDiff, AssignmentStore};
pub use classifier::{classify, ErrorCategory};
pub use config::MembershipConfig;
pub use error::FatalError;
pub use message::{Diagnostic, HeartbeatRequest, HeartbeatResponse};
pub use rebalance::{RebalanceCoordinator, RebalanceEvent, RebalanceKind};
pub use scheduler::HeartbeatScheduler;
pub use state::{Delivery, MembershipOutput, MembershipStateMachine, MembershipStatus};

/// Membership defaults.
pub mod limits {
    /// Default rebalance timeout (milliseconds).
    pub const REBALANCE_TIMEOUT_MS_DEFAULT: u64 = 300_000; // 5min

    /// Heartbeat interval used until the coordinator supplies one (milliseconds).
    pub const HEARTBEAT_INTERVAL_MS_DEFAULT: u64 = 5_000;

    /// Delay before retrying after a retriable error (milliseconds).
    pub const RETRY_BACKOFF_MS_DEFAULT: u64 = 100;

    /// Consecutive fast retries before falling back to interval pacing.
    pub const RETRY_LIMIT_DEFAULT: u32 = 3;

    /// Bound on the leave-group round trip during close (milliseconds).
    pub const CLOSE_TIMEOUT_MS_DEFAULT: u64 = 10_000;

    /// Largest rebalance timeout the heartbeat's INT32 field can carry.
    #[allow(clippy::cast_sign_loss)]
    pub const REBALANCE_TIMEOUT_MS_WIRE_MAX: u64 = i32::MAX as u64;
}

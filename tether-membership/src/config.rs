//! Membership configuration.

use tether_core::{Error, GroupId, Limits, Result};

use crate::limits::{
    CLOSE_TIMEOUT_MS_DEFAULT, HEARTBEAT_INTERVAL_MS_DEFAULT, REBALANCE_TIMEOUT_MS_DEFAULT,
    REBALANCE_TIMEOUT_MS_WIRE_MAX, RETRY_BACKOFF_MS_DEFAULT, RETRY_LIMIT_DEFAULT,
};

/// Configuration for one group membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipConfig {
    /// The group to join.
    pub group_id: GroupId,

    /// Time the coordinator waits for this member to complete a rebalance.
    pub rebalance_timeout_ms: u64,

    /// Heartbeat interval until the coordinator supplies one.
    pub heartbeat_interval_ms: u64,

    /// Delay before a retry after a retriable error.
    pub retry_backoff_ms: u64,

    /// Consecutive fast retries before falling back to interval pacing.
    pub retry_limit: u32,

    /// Bound on the leave-group round trip during close.
    pub close_timeout_ms: u64,

    /// Static membership instance id, sent on (re)join.
    pub instance_id: Option<String>,

    /// Rack of this member, sent on (re)join.
    pub rack_id: Option<String>,

    /// Server-side assignor to request, sent on (re)join.
    pub server_assignor: Option<String>,

    /// Hard bounds.
    pub limits: Limits,
}

impl MembershipConfig {
    /// Creates a configuration with defaults for the given group.
    #[must_use]
    pub fn new(group_id: impl Into<GroupId>) -> Self {
        Self {
            group_id: group_id.into(),
            rebalance_timeout_ms: REBALANCE_TIMEOUT_MS_DEFAULT,
            heartbeat_interval_ms: HEARTBEAT_INTERVAL_MS_DEFAULT,
            retry_backoff_ms: RETRY_BACKOFF_MS_DEFAULT,
            retry_limit: RETRY_LIMIT_DEFAULT,
            close_timeout_ms: CLOSE_TIMEOUT_MS_DEFAULT,
            instance_id: None,
            rack_id: None,
            server_assignor: None,
            limits: Limits::new(),
        }
    }

    /// Sets the rebalance timeout.
    #[must_use]
    pub const fn with_rebalance_timeout_ms(mut self, ms: u64) -> Self {
        self.rebalance_timeout_ms = ms;
        self
    }

    /// Sets the initial heartbeat interval.
    #[must_use]
    pub const fn with_heartbeat_interval_ms(mut self, ms: u64) -> Self {
        self.heartbeat_interval_ms = ms;
        self
    }

    /// Sets the retry backoff and the number of fast retries.
    #[must_use]
    pub const fn with_retry(mut self, backoff_ms: u64, limit: u32) -> Self {
        self.retry_backoff_ms = backoff_ms;
        self.retry_limit = limit;
        self
    }

    /// Sets the close timeout.
    #[must_use]
    pub const fn with_close_timeout_ms(mut self, ms: u64) -> Self {
        self.close_timeout_ms = ms;
        self
    }

    /// Sets the static membership instance id.
    #[must_use]
    pub fn with_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = Some(instance_id.into());
        self
    }

    /// Sets the rack id.
    #[must_use]
    pub fn with_rack_id(mut self, rack_id: impl Into<String>) -> Self {
        self.rack_id = Some(rack_id.into());
        self
    }

    /// Sets the server-side assignor.
    #[must_use]
    pub fn with_server_assignor(mut self, assignor: impl Into<String>) -> Self {
        self.server_assignor = Some(assignor.into());
        self
    }

    /// Replaces the limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns an error if any value is out of bounds.
    pub fn validate(&self) -> Result<()> {
        self.limits.validate()?;

        if self.group_id.is_empty() {
            return Err(Error::InvalidArgument {
                name: "group_id",
                reason: "must not be empty",
            });
        }
        if self.heartbeat_interval_ms < self.limits.min_heartbeat_interval_ms {
            return Err(Error::InvalidArgument {
                name: "heartbeat_interval_ms",
                reason: "below min_heartbeat_interval_ms",
            });
        }
        if self.heartbeat_interval_ms > self.limits.max_heartbeat_interval_ms {
            return Err(Error::LimitExceeded {
                limit: "heartbeat_interval_ms",
                max: self.limits.max_heartbeat_interval_ms,
                actual: self.heartbeat_interval_ms,
            });
        }
        if self.retry_limit > self.limits.max_retry_limit {
            return Err(Error::LimitExceeded {
                limit: "retry_limit",
                max: u64::from(self.limits.max_retry_limit),
                actual: u64::from(self.retry_limit),
            });
        }
        if self.retry_backoff_ms > self.limits.max_retry_backoff_ms {
            return Err(Error::LimitExceeded {
                limit: "retry_backoff_ms",
                max: self.limits.max_retry_backoff_ms,
                actual: self.retry_backoff_ms,
            });
        }
        if self.close_timeout_ms == 0 {
            return Err(Error::InvalidArgument {
                name: "close_timeout_ms",
                reason: "must be positive",
            });
        }
        if self.close_timeout_ms > self.limits.max_close_timeout_ms {
            return Err(Error::LimitExceeded {
                limit: "close_timeout_ms",
                max: self.limits.max_close_timeout_ms,
                actual: self.close_timeout_ms,
            });
        }
        if self.rebalance_timeout_ms == 0 {
            return Err(Error::InvalidArgument {
                name: "rebalance_timeout_ms",
                reason: "must be positive",
            });
        }
        // Relaxed limits still cannot exceed what the request can carry.
        let max_rebalance_timeout_ms = self
            .limits
            .max_rebalance_timeout_ms
            .min(REBALANCE_TIMEOUT_MS_WIRE_MAX);
        if self.rebalance_timeout_ms > max_rebalance_timeout_ms {
            return Err(Error::LimitExceeded {
                limit: "rebalance_timeout_ms",
                max: max_rebalance_timeout_ms,
                actual: self.rebalance_timeout_ms,
            });
        }
        Ok(())
    }
}

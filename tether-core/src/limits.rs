//! Membership limits and configuration bounds.
//!
//! Every timer and the subscription size have an explicit bound.
//! Configuration that falls outside these bounds is rejected before a
//! consumer is created.

/// Hard bounds applied when validating membership configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    // Heartbeat pacing.
    /// Smallest heartbeat interval accepted from config or from the coordinator.
    pub min_heartbeat_interval_ms: u64,
    /// Largest heartbeat interval accepted from config or from the coordinator.
    pub max_heartbeat_interval_ms: u64,
    /// Upper bound on `retry_limit`.
    pub max_retry_limit: u32,
    /// Upper bound on `retry_backoff_ms`.
    pub max_retry_backoff_ms: u64,

    // Shutdown.
    /// Upper bound on `close_timeout_ms`.
    pub max_close_timeout_ms: u64,
    /// Upper bound on `rebalance_timeout_ms`.
    pub max_rebalance_timeout_ms: u64,

    // Sizes.
    /// Maximum number of topics in one subscription.
    pub max_subscription_topics: usize,
}

impl Limits {
    /// Creates limits with safe defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            // Heartbeat: 10ms floor, 5min ceiling, up to 100 fast retries.
            min_heartbeat_interval_ms: 10,
            max_heartbeat_interval_ms: 5 * 60 * 1000,
            max_retry_limit: 100,
            max_retry_backoff_ms: 60 * 1000,

            // Shutdown: 5min close, 30min rebalance.
            max_close_timeout_ms: 5 * 60 * 1000,
            max_rebalance_timeout_ms: 30 * 60 * 1000,

            // Sizes: 10k topics.
            max_subscription_topics: 10_000,
        }
    }

    /// Clamps a heartbeat interval into the accepted range.
    #[must_use]
    pub fn clamp_heartbeat_interval(&self, interval_ms: u64) -> u64 {
        interval_ms.clamp(self.min_heartbeat_interval_ms, self.max_heartbeat_interval_ms)
    }

    /// Validates that all limits are internally consistent.
    ///
    /// # Errors
    /// Returns an error if any limits are invalid or inconsistent.
    pub fn validate(&self) -> crate::Result<()> {
        if self.min_heartbeat_interval_ms == 0 {
            return Err(crate::Error::InvalidArgument {
                name: "min_heartbeat_interval_ms",
                reason: "must be positive",
            });
        }

        if self.max_heartbeat_interval_ms < self.min_heartbeat_interval_ms {
            return Err(crate::Error::InvalidArgument {
                name: "max_heartbeat_interval_ms",
                reason: "must be >= min_heartbeat_interval_ms",
            });
        }

        if self.max_close_timeout_ms == 0 {
            return Err(crate::Error::InvalidArgument {
                name: "max_close_timeout_ms",
                reason: "must be positive",
            });
        }

        if self.max_subscription_topics == 0 {
            return Err(crate::Error::InvalidArgument {
                name: "max_subscription_topics",
                reason: "must be positive",
            });
        }

        Ok(())
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_are_valid() {
        let limits = Limits::new();
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn test_inverted_heartbeat_range() {
        let mut limits = Limits::new();
        limits.min_heartbeat_interval_ms = 1000;
        limits.max_heartbeat_interval_ms = 500;
        assert!(limits.validate().is_err());
    }

    #[test]
    fn test_empty_subscription_bound() {
        let mut limits = Limits::new();
        limits.max_subscription_topics = 0;
        assert!(limits.validate().is_err());
    }

    #[test]
    fn test_clamp_heartbeat_interval() {
        let limits = Limits::new();
        assert_eq!(limits.clamp_heartbeat_interval(0), 10);
        assert_eq!(limits.clamp_heartbeat_interval(500), 500);
        assert_eq!(limits.clamp_heartbeat_interval(u64::MAX), 5 * 60 * 1000);
    }
}

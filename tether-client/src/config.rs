//! Client configuration.

use std::time::Duration;

use tether_core::{Error, GroupId, Result};
use tether_membership::MembershipConfig;

/// Default bound on one heartbeat exchange.
pub const REQUEST_TIMEOUT_MS_DEFAULT: u64 = 30_000;

/// Default capacity of the diagnostics channel.
pub const DIAGNOSTICS_CAPACITY_DEFAULT: usize = 64;

/// Configuration for a `GroupConsumer`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Membership configuration.
    pub membership: MembershipConfig,
    /// Client id sent in every request header.
    pub client_id: String,
    /// Bound on one heartbeat exchange.
    pub request_timeout_ms: u64,
    /// Capacity of the diagnostics channel; diagnostics are dropped when full.
    pub diagnostics_capacity: usize,
}

impl ClientConfig {
    /// Creates a configuration with defaults for the given group.
    #[must_use]
    pub fn new(group_id: impl Into<GroupId>) -> Self {
        Self {
            membership: MembershipConfig::new(group_id),
            client_id: "tether".to_string(),
            request_timeout_ms: REQUEST_TIMEOUT_MS_DEFAULT,
            diagnostics_capacity: DIAGNOSTICS_CAPACITY_DEFAULT,
        }
    }

    /// Replaces the membership configuration.
    #[must_use]
    pub fn with_membership(mut self, membership: MembershipConfig) -> Self {
        self.membership = membership;
        self
    }

    /// Sets the client id.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Sets the heartbeat request timeout.
    #[must_use]
    pub const fn with_request_timeout_ms(mut self, ms: u64) -> Self {
        self.request_timeout_ms = ms;
        self
    }

    /// Sets the diagnostics channel capacity.
    #[must_use]
    pub const fn with_diagnostics_capacity(mut self, capacity: usize) -> Self {
        self.diagnostics_capacity = capacity;
        self
    }

    /// Returns the request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns an error if any value is out of bounds.
    pub fn validate(&self) -> Result<()> {
        self.membership.validate()?;
        if self.client_id.is_empty() {
            return Err(Error::InvalidArgument {
                name: "client_id",
                reason: "must not be empty",
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(Error::InvalidArgument {
                name: "request_timeout_ms",
                reason: "must be positive",
            });
        }
        if self.diagnostics_capacity == 0 {
            return Err(Error::InvalidArgument {
                name: "diagnostics_capacity",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

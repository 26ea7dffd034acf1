//! Heartbeat pacing.
//!
//! At most one heartbeat is outstanding. A heartbeat is due when the interval
//! has elapsed or an immediate trigger was requested. Retriable failures are
//! retried after a short backoff a bounded number of times, then pacing falls
//! back to the regular interval.

/// Decides when the next heartbeat is due.
#[derive(Debug, Clone)]
pub struct HeartbeatScheduler {
    interval_ms: u64,
    retry_backoff_ms: u64,
    retry_limit: u32,
    next_due_at_ms: u64,
    in_flight: bool,
    /// An immediate trigger arrived while a heartbeat was in flight.
    urgent: bool,
    consecutive_retries: u32,
    suspended: bool,
}

impl HeartbeatScheduler {
    /// Creates a suspended scheduler. Nothing is due until `trigger_now`.
    #[must_use]
    pub const fn new(interval_ms: u64, retry_backoff_ms: u64, retry_limit: u32) -> Self {
        Self {
            interval_ms,
            retry_backoff_ms,
            retry_limit,
            next_due_at_ms: 0,
            in_flight: false,
            urgent: false,
            consecutive_retries: 0,
            suspended: true,
        }
    }

    /// Current heartbeat interval.
    #[must_use]
    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Returns true if a heartbeat is outstanding.
    #[must_use]
    pub const fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Consecutive retriable failures since the last success.
    #[must_use]
    pub const fn consecutive_retries(&self) -> u32 {
        self.consecutive_retries
    }

    /// Replaces the interval. Takes effect from the next success.
    pub fn set_interval_ms(&mut self, interval_ms: u64) {
        self.interval_ms = interval_ms;
    }

    /// Requests a heartbeat as soon as none is outstanding.
    pub fn trigger_now(&mut self, now_ms: u64) {
        self.suspended = false;
        if self.in_flight {
            self.urgent = true;
        } else {
            self.next_due_at_ms = now_ms;
        }
    }

    /// Stops scheduling until the next `trigger_now`.
    pub fn suspend(&mut self) {
        self.suspended = true;
        self.urgent = false;
    }

    /// Returns true if a heartbeat should be sent now.
    #[must_use]
    pub const fn is_due(&self, now_ms: u64) -> bool {
        !self.suspended && !self.in_flight && now_ms >= self.next_due_at_ms
    }

    /// Records that a heartbeat was sent.
    pub fn on_sent(&mut self) {
        debug_assert!(!self.in_flight, "at most one heartbeat in flight");
        self.in_flight = true;
    }

    /// Records a successful response and paces the next heartbeat.
    pub fn on_success(&mut self, now_ms: u64) {
        self.consecutive_retries = 0;
        self.complete(now_ms, self.interval_ms);
    }

    /// Records a retriable failure. Returns the delay until the retry.
    pub fn on_retriable(&mut self, now_ms: u64) -> u64 {
        self.consecutive_retries = self.consecutive_retries.saturating_add(1);
        let delay_ms = if self.consecutive_retries <= self.retry_limit {
            self.retry_backoff_ms
        } else {
            self.interval_ms
        };
        self.complete(now_ms, delay_ms);
        delay_ms
    }

    /// Clears the outstanding heartbeat without scheduling another.
    pub fn on_abandoned(&mut self) {
        self.in_flight = false;
        self.urgent = false;
        self.consecutive_retries = 0;
    }

    /// Next instant at which `is_due` may become true, if any.
    #[must_use]
    pub const fn next_wakeup_ms(&self) -> Option<u64> {
        if self.suspended || self.in_flight {
            None
        } else {
            Some(self.next_due_at_ms)
        }
    }

    fn complete(&mut self, now_ms: u64, delay_ms: u64) {
        self.in_flight = false;
        self.next_due_at_ms = if self.urgent {
            now_ms
        } else {
            now_ms.saturating_add(delay_ms)
        };
        self.urgent = false;
    }
}

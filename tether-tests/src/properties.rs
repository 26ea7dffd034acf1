//! Property definitions and checkers for membership tests.
//!
//! Properties are invariants that must hold for every run, whatever errors
//! the coordinator injects. The checker is fed the heartbeats a member sent
//! and the events and errors the application observed, in order.

use tether_core::{MemberEpoch, PartitionSet};
use tether_membership::{HeartbeatRequest, RebalanceEvent, RebalanceKind};

// ============================================================================
// Property Violation Types
// ============================================================================

/// A violation of a membership property.
#[derive(Debug, Clone)]
pub enum PropertyViolation {
    /// A heartbeat was sent after the fatal error was raised.
    HeartbeatAfterFatal {
        /// Index of the offending heartbeat.
        index: usize,
    },
    /// A non-leave heartbeat followed a leave heartbeat.
    HeartbeatAfterLeave {
        /// Index of the offending heartbeat.
        index: usize,
    },
    /// The epoch went backwards within one membership instance.
    EpochDecreased {
        /// Index of the offending heartbeat.
        index: usize,
        /// Epoch of the previous heartbeat.
        previous: MemberEpoch,
        /// Epoch of this heartbeat.
        current: MemberEpoch,
    },
    /// An `Assign` event carried partitions the application already held.
    AssignOfHeld {
        /// Partitions both assigned and held.
        partitions: PartitionSet,
    },
    /// A `Revoke` or `Lost` event carried partitions the application did not hold.
    ReleaseOfUnheld {
        /// The event kind.
        kind: RebalanceKind,
        /// Partitions released but not held.
        partitions: PartitionSet,
    },
    /// A rebalance event was observed after the fatal error, other than the
    /// final `Lost` from close.
    EventAfterFatal {
        /// The event kind.
        kind: RebalanceKind,
    },
    /// The fatal error was observed more than once.
    FatalSurfacedTwice,
    /// A heartbeat reported an owned set the application had not reached.
    OwnedNotHeld {
        /// Index of the offending heartbeat.
        index: usize,
        /// The owned set the heartbeat carried.
        reported: PartitionSet,
        /// What the application held when it was sent.
        held: PartitionSet,
    },
}

impl std::fmt::Display for PropertyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HeartbeatAfterFatal { index } => {
                write!(f, "heartbeat #{index} sent after the fatal error")
            }
            Self::HeartbeatAfterLeave { index } => {
                write!(f, "heartbeat #{index} sent after the leave heartbeat")
            }
            Self::EpochDecreased {
                index,
                previous,
                current,
            } => write!(
                f,
                "heartbeat #{index} epoch went from {previous} to {current}"
            ),
            Self::AssignOfHeld { partitions } => {
                write!(f, "assign of already held partitions {partitions}")
            }
            Self::ReleaseOfUnheld { kind, partitions } => {
                write!(f, "{kind} of partitions not held: {partitions}")
            }
            Self::EventAfterFatal { kind } => write!(f, "{kind} delivered after the fatal error"),
            Self::FatalSurfacedTwice => write!(f, "fatal error surfaced more than once"),
            Self::OwnedNotHeld {
                index,
                reported,
                held,
            } => write!(
                f,
                "heartbeat #{index} reported owned {reported} while the application held {held}"
            ),
        }
    }
}

// ============================================================================
// Invariant Checker
// ============================================================================

/// Tracks what the application observed and verifies membership properties.
#[derive(Debug, Default)]
pub struct InvariantChecker {
    /// Partitions the application holds according to delivered events.
    held: PartitionSet,
    /// Heartbeats sent before the fatal error was raised.
    heartbeats_at_fatal: Option<usize>,
    /// Number of times the fatal error was observed.
    fatal_seen: u32,
    /// Events observed, in order.
    events: Vec<RebalanceEvent>,
    /// Violations found.
    violations: Vec<PropertyViolation>,
}

impl InvariantChecker {
    /// Creates a new checker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event the application has finished handling.
    pub fn record_event(&mut self, event: &RebalanceEvent) {
        if self.fatal_seen > 0 && !event.is_lost() {
            self.violations.push(PropertyViolation::EventAfterFatal { kind: event.kind() });
        }
        let partitions = event.partitions();
        match event.kind() {
            RebalanceKind::Assign => {
                let overlap: PartitionSet = partitions
                    .iter()
                    .filter(|tp| self.held.contains(tp))
                    .cloned()
                    .collect();
                if !overlap.is_empty() {
                    self.violations
                        .push(PropertyViolation::AssignOfHeld { partitions: overlap });
                }
                self.held.extend_from(partitions);
            }
            kind @ (RebalanceKind::Revoke | RebalanceKind::Lost) => {
                let unheld = partitions.difference(&self.held);
                if !unheld.is_empty() {
                    self.violations.push(PropertyViolation::ReleaseOfUnheld {
                        kind,
                        partitions: unheld,
                    });
                }
                self.held.subtract(partitions);
            }
        }
        self.events.push(event.clone());
    }

    /// Records that the fatal error reached the application.
    ///
    /// `heartbeats_sent` is the number of heartbeats sent so far.
    pub fn record_fatal(&mut self, heartbeats_sent: usize) {
        self.fatal_seen += 1;
        if self.fatal_seen > 1 {
            self.violations.push(PropertyViolation::FatalSurfacedTwice);
        }
        self.heartbeats_at_fatal.get_or_insert(heartbeats_sent);
    }

    /// Checks the owned set of a heartbeat as it is sent.
    ///
    /// `index` is the heartbeat's position among all sent.
    pub fn record_heartbeat(&mut self, index: usize, request: &HeartbeatRequest) {
        if let Some(reported) = &request.owned_partitions {
            if reported != &self.held {
                self.violations.push(PropertyViolation::OwnedNotHeld {
                    index,
                    reported: reported.clone(),
                    held: self.held.clone(),
                });
            }
        }
    }

    /// Checks the heartbeats a member sent.
    pub fn check_requests(&mut self, requests: &[HeartbeatRequest]) {
        if let Some(limit) = self.heartbeats_at_fatal {
            if requests.len() > limit {
                self.violations
                    .push(PropertyViolation::HeartbeatAfterFatal { index: limit });
            }
        }

        let mut left = false;
        let mut previous: Option<MemberEpoch> = None;
        for (index, request) in requests.iter().enumerate() {
            if request.is_leave() {
                left = true;
                continue;
            }
            if left {
                self.violations
                    .push(PropertyViolation::HeartbeatAfterLeave { index });
            }
            if request.is_join() {
                previous = None;
                continue;
            }
            if let Some(prev) = previous {
                if request.member_epoch.get() < prev.get() {
                    self.violations.push(PropertyViolation::EpochDecreased {
                        index,
                        previous: prev,
                        current: request.member_epoch,
                    });
                }
            }
            previous = Some(request.member_epoch);
        }
    }

    /// Partitions the application holds.
    #[must_use]
    pub const fn held(&self) -> &PartitionSet {
        &self.held
    }

    /// Events observed so far.
    #[must_use]
    pub fn events(&self) -> &[RebalanceEvent] {
        &self.events
    }

    /// Kinds of the events observed so far.
    #[must_use]
    pub fn event_kinds(&self) -> Vec<RebalanceKind> {
        self.events.iter().map(RebalanceEvent::kind).collect()
    }

    /// Number of `Lost` events observed.
    #[must_use]
    pub fn lost_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_lost()).count()
    }

    /// Violations found so far.
    #[must_use]
    pub fn violations(&self) -> &[PropertyViolation] {
        &self.violations
    }

    /// Panics with every violation found.
    ///
    /// # Panics
    /// Panics if any property was violated.
    pub fn assert_ok(&self) {
        assert!(
            self.violations.is_empty(),
            "property violations:\n{}",
            self.violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

#[cfg(test)]
mod tests {
    use tether_core::TopicPartition;

    use super::*;

    fn set(partitions: &[i32]) -> PartitionSet {
        partitions
            .iter()
            .map(|p| TopicPartition::new("orders", *p))
            .collect()
    }

    #[test]
    fn test_release_of_unheld_detected() {
        let mut checker = InvariantChecker::new();
        checker.record_event(&RebalanceEvent::Assign(set(&[0])));
        checker.record_event(&RebalanceEvent::Revoke(set(&[0, 1])));
        assert_eq!(checker.violations().len(), 1);
        assert!(checker.held().is_empty());
    }

    #[test]
    fn test_double_assign_detected() {
        let mut checker = InvariantChecker::new();
        checker.record_event(&RebalanceEvent::Assign(set(&[0, 1])));
        checker.record_event(&RebalanceEvent::Assign(set(&[1, 2])));
        assert!(matches!(
            checker.violations()[0],
            PropertyViolation::AssignOfHeld { .. }
        ));
    }

    #[test]
    fn test_owned_ahead_of_application_detected() {
        let mut checker = InvariantChecker::new();
        let request = HeartbeatRequest {
            group_id: "g".into(),
            member_id: "m-1".into(),
            member_epoch: MemberEpoch::new(1),
            subscribed_topics: None,
            owned_partitions: Some(set(&[0])),
            rebalance_timeout_ms: 300_000,
            instance_id: None,
            rack_id: None,
            server_assignor: None,
        };
        checker.record_heartbeat(3, &request);
        assert!(matches!(
            checker.violations()[0],
            PropertyViolation::OwnedNotHeld { index: 3, .. }
        ));

        checker.record_event(&RebalanceEvent::Assign(set(&[0])));
        checker.record_heartbeat(4, &request);
        assert_eq!(checker.violations().len(), 1);
    }

    #[test]
    fn test_lost_allowed_after_fatal() {
        let mut checker = InvariantChecker::new();
        checker.record_event(&RebalanceEvent::Assign(set(&[0])));
        checker.record_fatal(2);
        checker.record_event(&RebalanceEvent::Lost(set(&[0])));
        checker.assert_ok();
        assert_eq!(checker.lost_count(), 1);
    }
}

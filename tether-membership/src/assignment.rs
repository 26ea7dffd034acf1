//! Current and target partition assignment.
//!
//! `current` is the set the application has acknowledged; it changes only
//! when the application acknowledges a rebalance event. `target` is the set received from
//! the coordinator; it changes only on heartbeat success (or is dropped when
//! the membership is lost).

use tether_core::PartitionSet;

/// Partitions to revoke and to assign to move `current` to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssignmentDiff {
    /// `current \ target`.
    pub revoke: PartitionSet,
    /// `target \ current`.
    pub assign: PartitionSet,
}

impl AssignmentDiff {
    /// Returns true if `current` already equals `target`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.revoke.is_empty() && self.assign.is_empty()
    }
}

/// Holds the acknowledged and the intended assignment.
#[derive(Debug, Clone, Default)]
pub struct AssignmentStore {
    current: PartitionSet,
    target: PartitionSet,
}

impl AssignmentStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: PartitionSet::new(),
            target: PartitionSet::new(),
        }
    }

    /// Partitions the application holds.
    #[must_use]
    pub const fn current(&self) -> &PartitionSet {
        &self.current
    }

    /// Partitions the coordinator wants this member to hold.
    #[must_use]
    pub const fn target(&self) -> &PartitionSet {
        &self.target
    }

    /// Replaces the target. Returns true if it changed.
    pub fn set_target(&mut self, target: PartitionSet) -> bool {
        if self.target == target {
            return false;
        }
        self.target = target;
        true
    }

    /// Drops the target. Whatever is still held will reconcile to a revoke.
    pub fn clear_target(&mut self) {
        self.target = PartitionSet::new();
    }

    /// Computes what separates `current` from `target`.
    #[must_use]
    pub fn diff(&self) -> AssignmentDiff {
        AssignmentDiff {
            revoke: self.current.difference(&self.target),
            assign: self.target.difference(&self.current),
        }
    }

    /// Returns true if `current` differs from `target`.
    #[must_use]
    pub fn needs_reconcile(&self) -> bool {
        self.current != self.target
    }

    /// Records that the application was handed an assignment.
    pub fn apply_assign(&mut self, partitions: &PartitionSet) {
        self.current.extend_from(partitions);
    }

    /// Records that the application released partitions.
    pub fn apply_revoke(&mut self, partitions: &PartitionSet) {
        self.current.subtract(partitions);
    }

    /// Releases everything held and drops the target.
    pub fn release_all(&mut self) -> PartitionSet {
        self.target = PartitionSet::new();
        std::mem::take(&mut self.current)
    }
}

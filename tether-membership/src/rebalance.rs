//! Rebalance event sequencing.
//!
//! Events leave the coordinator one at a time. A waiting loss (partitions
//! lost to fencing) goes first; otherwise the next event is computed lazily
//! from the assignment diff, revokes before assigns. A handed-out event is
//! applied to the assignment store only once the application acknowledges
//! it; until then it is offered again.

use std::fmt;

use tether_core::PartitionSet;

use crate::assignment::AssignmentStore;

/// Kind of a rebalance event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RebalanceKind {
    /// Partitions were assigned.
    Assign,
    /// Partitions were revoked in an orderly way.
    Revoke,
    /// Partitions were lost without an orderly revoke.
    Lost,
}

impl fmt::Display for RebalanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Assign => "assign",
            Self::Revoke => "revoke",
            Self::Lost => "lost",
        };
        f.write_str(name)
    }
}

/// A change in the partitions held by the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebalanceEvent {
    /// The partitions may now be consumed.
    Assign(PartitionSet),
    /// The partitions must be released; the membership is intact.
    Revoke(PartitionSet),
    /// The partitions are already gone; the membership was lost.
    Lost(PartitionSet),
}

impl RebalanceEvent {
    /// Returns the kind of this event.
    #[must_use]
    pub const fn kind(&self) -> RebalanceKind {
        match self {
            Self::Assign(_) => RebalanceKind::Assign,
            Self::Revoke(_) => RebalanceKind::Revoke,
            Self::Lost(_) => RebalanceKind::Lost,
        }
    }

    /// Returns the partitions the event is about.
    #[must_use]
    pub const fn partitions(&self) -> &PartitionSet {
        match self {
            Self::Assign(p) | Self::Revoke(p) | Self::Lost(p) => p,
        }
    }

    /// Returns true for `Lost`.
    #[must_use]
    pub const fn is_lost(&self) -> bool {
        matches!(self, Self::Lost(_))
    }

    fn apply(&self, store: &mut AssignmentStore) {
        match self {
            Self::Assign(p) => store.apply_assign(p),
            Self::Revoke(p) | Self::Lost(p) => store.apply_revoke(p),
        }
    }
}

impl fmt::Display for RebalanceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.partitions())
    }
}

/// Hands rebalance events to the application one at a time.
///
/// At most one event is outstanding: handed out but not yet acknowledged.
#[derive(Debug, Clone, Default)]
pub struct RebalanceCoordinator {
    /// Partitions lost to fencing, not yet handed out.
    lost: Option<PartitionSet>,
    /// Handed out, waiting for the application to finish with it.
    outstanding: Option<RebalanceEvent>,
    delivered: u64,
}

impl RebalanceCoordinator {
    /// Creates a coordinator with nothing pending.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lost: None,
            outstanding: None,
            delivered: 0,
        }
    }

    /// Number of events acknowledged so far, the final event included.
    #[must_use]
    pub const fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Returns true if a `Lost` event is waiting or outstanding.
    #[must_use]
    pub fn has_queued_lost(&self) -> bool {
        self.lost.is_some() || self.outstanding.as_ref().is_some_and(RebalanceEvent::is_lost)
    }

    /// What the application will hold once the outstanding event is
    /// acknowledged.
    #[must_use]
    pub fn held_after_outstanding(&self, store: &AssignmentStore) -> PartitionSet {
        match &self.outstanding {
            Some(RebalanceEvent::Assign(p)) => store.current().union(p),
            Some(RebalanceEvent::Revoke(p) | RebalanceEvent::Lost(p)) => {
                store.current().difference(p)
            }
            None => store.current().clone(),
        }
    }

    /// Queues the loss of `partitions`.
    ///
    /// Returns false, queuing nothing, if the set is empty or a loss is
    /// already waiting.
    pub fn queue_lost(&mut self, partitions: PartitionSet) -> bool {
        if partitions.is_empty() || self.has_queued_lost() {
            return false;
        }
        self.lost = Some(partitions);
        true
    }

    /// Returns true if `next_event` would hand out a new event.
    #[must_use]
    pub fn has_pending(&self, store: &AssignmentStore, reconcile: bool) -> bool {
        self.outstanding.is_none()
            && (self.lost.is_some() || (reconcile && store.needs_reconcile()))
    }

    /// Hands out the next event without applying it.
    ///
    /// An outstanding event is handed out again. With `reconcile` false only
    /// a waiting loss is handed out.
    pub fn next_event(&mut self, store: &AssignmentStore, reconcile: bool) -> Option<RebalanceEvent> {
        if let Some(event) = &self.outstanding {
            return Some(event.clone());
        }
        let event = match self.lost.take() {
            Some(partitions) => RebalanceEvent::Lost(partitions),
            None if reconcile => {
                let diff = store.diff();
                if !diff.revoke.is_empty() {
                    RebalanceEvent::Revoke(diff.revoke)
                } else if !diff.assign.is_empty() {
                    RebalanceEvent::Assign(diff.assign)
                } else {
                    return None;
                }
            }
            None => return None,
        };
        self.outstanding = Some(event.clone());
        Some(event)
    }

    /// Applies the outstanding event to the store and returns it.
    pub fn acknowledge(&mut self, store: &mut AssignmentStore) -> Option<RebalanceEvent> {
        let event = self.outstanding.take()?;
        event.apply(store);
        self.delivered += 1;
        Some(event)
    }

    /// Hands out the final event of a membership and drops everything else.
    ///
    /// Everything held is revoked, or reported lost when `lost` is set or a
    /// loss is waiting. An unacknowledged event never reached the
    /// application and is dropped without being applied.
    pub fn final_event(&mut self, store: &mut AssignmentStore, lost: bool) -> Option<RebalanceEvent> {
        let lost = lost || self.has_queued_lost();
        self.lost = None;
        self.outstanding = None;

        let held = store.release_all();
        if held.is_empty() {
            return None;
        }
        self.delivered += 1;
        Some(if lost {
            RebalanceEvent::Lost(held)
        } else {
            RebalanceEvent::Revoke(held)
        })
    }
}

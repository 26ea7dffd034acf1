//! Rebalance listener.

use tether_membership::RebalanceEvent;

/// Application callback for rebalance events.
///
/// Invoked synchronously inside `poll` or `close`, once per delivered event.
/// When it returns, assigned partitions are considered readable and revoked
/// or lost partitions released.
pub trait RebalanceListener: Send + 'static {
    /// Handles one event.
    fn on_rebalance(&mut self, event: &RebalanceEvent);
}

impl<F> RebalanceListener for F
where
    F: FnMut(&RebalanceEvent) + Send + 'static,
{
    fn on_rebalance(&mut self, event: &RebalanceEvent) {
        self(event);
    }
}

/// A listener that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl RebalanceListener for NoopListener {
    fn on_rebalance(&mut self, _event: &RebalanceEvent) {}
}

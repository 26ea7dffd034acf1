//! Heartbeat transport abstraction.
//!
//! The driver only needs one capability from the network: exchange a
//! heartbeat request for a response. Production code uses `KafkaTransport`;
//! tests plug in a scripted coordinator.

use async_trait::async_trait;
use tether_membership::{HeartbeatRequest, HeartbeatResponse};

use crate::error::TransportResult;

/// Request/response exchange with the group coordinator.
///
/// # Implementation Notes
///
/// Implementations must be `Send + Sync` for use across async tasks.
/// The `Clone` bound lets the driver move a handle into each exchange task.
/// An exchange may be cancelled by dropping its future (request timeout);
/// implementations must leave themselves usable afterwards.
#[async_trait]
pub trait HeartbeatTransport: Send + Sync + Clone + 'static {
    /// Sends a heartbeat and waits for the coordinator's answer.
    ///
    /// Protocol errors are returned inside the response. `Err` means no
    /// response was received.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails, the request cannot be
    /// encoded, or the response cannot be decoded.
    async fn heartbeat(&self, request: HeartbeatRequest) -> TransportResult<HeartbeatResponse>;
}

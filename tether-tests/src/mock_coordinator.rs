//! Scripted group coordinator for end-to-end tests.
//!
//! `MockCoordinator` implements `HeartbeatTransport` in memory. By default it
//! accepts every member and assigns it every partition of its subscribed
//! topics. Tests script upcoming requests with `skip_requests` and
//! `push_request_errors`; each scripted entry answers exactly one request.
//!
//! Client-local codes (`_TRANSPORT`, `_TIMED_OUT`, ...) cannot travel in a
//! response. They are injected as transport failures instead.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tether_client::{HeartbeatTransport, TransportError, TransportResult};
use tether_core::{ErrorCode, MemberEpoch, MemberId, PartitionSet, TopicPartition};
use tether_membership::{HeartbeatRequest, HeartbeatResponse};
use tokio::time::Instant;
use tracing::debug;

/// Heartbeat interval the mock hands to members.
pub const MOCK_HEARTBEAT_INTERVAL_MS: u64 = 500;

/// A request seen by the coordinator.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// When the request arrived.
    pub at: Instant,
    /// The request.
    pub request: HeartbeatRequest,
    /// The error injected for it, if any.
    pub injected: Option<ErrorCode>,
}

#[derive(Debug)]
struct State {
    partitions_per_topic: i32,
    script: VecDeque<Option<ErrorCode>>,
    requests: Vec<RecordedRequest>,
    subscription: Vec<String>,
    group_epoch: i32,
    members_joined: u32,
}

impl State {
    fn assignment(&self) -> PartitionSet {
        self.subscription
            .iter()
            .flat_map(|topic| {
                (0..self.partitions_per_topic).map(move |p| TopicPartition::new(topic.clone(), p))
            })
            .collect()
    }

    fn respond(&mut self, request: &HeartbeatRequest) -> HeartbeatResponse {
        if request.is_leave() {
            return HeartbeatResponse::ok(request.member_id.clone(), MemberEpoch::LEAVE);
        }

        if let Some(topics) = &request.subscribed_topics {
            self.subscription.clone_from(topics);
        }
        let member_id: MemberId = if request.is_join() {
            self.group_epoch += 1;
            if request.member_id.is_empty() {
                self.members_joined += 1;
                format!("member-{}", self.members_joined).into()
            } else {
                request.member_id.clone()
            }
        } else {
            request.member_id.clone()
        };

        HeartbeatResponse::ok(member_id, MemberEpoch::new(self.group_epoch))
            .with_heartbeat_interval_ms(MOCK_HEARTBEAT_INTERVAL_MS)
            .with_assignment(self.assignment())
    }
}

/// In-memory coordinator with scripted error injection.
#[derive(Debug, Clone)]
pub struct MockCoordinator {
    state: Arc<Mutex<State>>,
}

impl MockCoordinator {
    /// Creates a coordinator whose topics each have `partitions_per_topic`
    /// partitions.
    #[must_use]
    pub fn new(partitions_per_topic: i32) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                partitions_per_topic,
                script: VecDeque::new(),
                requests: Vec::new(),
                subscription: Vec::new(),
                group_epoch: 0,
                members_joined: 0,
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("lock poisoned")
    }

    /// Queues errors for the next requests, one per request.
    pub fn push_request_errors(&self, codes: &[ErrorCode]) {
        self.lock().script.extend(codes.iter().copied().map(Some));
    }

    /// Lets the next `count` scripted requests through to the default responder.
    pub fn skip_requests(&self, count: usize) {
        self.lock().script.extend(std::iter::repeat(None).take(count));
    }

    /// Returns every request seen so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests seen so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Number of leave-group heartbeats seen so far.
    #[must_use]
    pub fn leave_count(&self) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.request.is_leave())
            .count()
    }

    /// Number of scripted entries not yet consumed.
    #[must_use]
    pub fn pending_script(&self) -> usize {
        self.lock().script.len()
    }

    /// Waits until at least `count` requests were seen.
    ///
    /// Returns false if `timeout` elapses first.
    pub async fn wait_for_requests(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.request_count() < count {
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        true
    }
}

#[async_trait]
impl HeartbeatTransport for MockCoordinator {
    async fn heartbeat(&self, request: HeartbeatRequest) -> TransportResult<HeartbeatResponse> {
        let mut state = self.lock();
        let injected = state.script.pop_front().flatten();
        debug!(
            member_id = %request.member_id,
            epoch = %request.member_epoch,
            injected = ?injected,
            "mock coordinator received heartbeat"
        );
        state.requests.push(RecordedRequest {
            at: Instant::now(),
            request: request.clone(),
            injected,
        });

        match injected {
            None => Ok(state.respond(&request)),
            Some(ErrorCode::TimedOut) => Err(TransportError::Timeout { after_ms: 0 }),
            Some(code) if code.is_local() => Err(TransportError::ConnectionClosed),
            Some(code) => Ok(HeartbeatResponse::error(code)
                .with_message(format!("injected {}", code.name()))),
        }
    }
}

//! Background task that owns the membership state machine.
//!
//! The driver is the only writer of membership state. It sends heartbeats,
//! feeds their outcomes back, and answers the consumer handle's commands.
//! Each heartbeat exchange runs in its own task so commands are served while
//! a request is outstanding.

use std::sync::Arc;
use std::time::Duration;

use tether_core::{MemberEpoch, MemberId, PartitionSet};
use tether_membership::{
    Delivery, Diagnostic, FatalError, HeartbeatRequest, HeartbeatResponse, MembershipOutput,
    MembershipStateMachine, MembershipStatus, RebalanceEvent,
};
use tokio::sync::{mpsc, oneshot, Notify};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::{TransportError, TransportResult};
use crate::transport::HeartbeatTransport;

/// Commands sent from the consumer handle to the driver.
#[derive(Debug)]
pub(crate) enum Command {
    /// Replace the subscription.
    Subscribe {
        topics: Vec<String>,
        response: oneshot::Sender<tether_core::Result<()>>,
    },
    /// Take at most one pending delivery.
    Poll {
        response: oneshot::Sender<Option<Delivery>>,
    },
    /// The listener returned for the event last handed out.
    Acknowledge,
    /// First step of close.
    BeginClose {
        response: oneshot::Sender<Option<RebalanceEvent>>,
    },
    /// Second step of close. Answered when close completes.
    Leave {
        response: oneshot::Sender<Result<(), FatalError>>,
    },
    /// Read-only view of the membership.
    Snapshot {
        response: oneshot::Sender<MembershipSnapshot>,
    },
}

/// Point-in-time view of the membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipSnapshot {
    /// Lifecycle state.
    pub status: MembershipStatus,
    /// Member id, empty before the first successful heartbeat.
    pub member_id: MemberId,
    /// Current epoch.
    pub member_epoch: MemberEpoch,
    /// Partitions the application holds.
    pub assignment: PartitionSet,
    /// Heartbeats sent so far.
    pub heartbeats_sent: u64,
    /// Rebalance events acknowledged so far.
    pub events_delivered: u64,
}

/// Owns the state machine and performs its I/O.
pub(crate) struct Driver<T> {
    machine: MembershipStateMachine,
    transport: T,
    request_timeout: Duration,
    start: Instant,
    completions: mpsc::Sender<TransportResult<HeartbeatResponse>>,
    diagnostics: mpsc::Sender<Diagnostic>,
    ready: Arc<Notify>,
    close_waiters: Vec<oneshot::Sender<Result<(), FatalError>>>,
}

impl<T: HeartbeatTransport> Driver<T> {
    pub(crate) fn new(
        machine: MembershipStateMachine,
        transport: T,
        request_timeout: Duration,
        completions: mpsc::Sender<TransportResult<HeartbeatResponse>>,
        diagnostics: mpsc::Sender<Diagnostic>,
        ready: Arc<Notify>,
    ) -> Self {
        Self {
            machine,
            transport,
            request_timeout,
            start: Instant::now(),
            completions,
            diagnostics,
            ready,
            close_waiters: Vec::new(),
        }
    }

    /// Milliseconds since the driver started.
    fn now_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Main driver loop. Returns when the consumer handle is dropped.
    pub(crate) async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut completions: mpsc::Receiver<TransportResult<HeartbeatResponse>>,
    ) {
        info!(group_id = %self.machine.config().group_id, "membership driver started");

        loop {
            let wakeup = self
                .machine
                .next_wakeup_ms()
                .map(|ms| self.start + Duration::from_millis(ms));

            tokio::select! {
                cmd = commands.recv() => {
                    let Some(cmd) = cmd else {
                        debug!(
                            group_id = %self.machine.config().group_id,
                            "consumer handle dropped"
                        );
                        break;
                    };
                    self.handle_command(cmd);
                }

                Some(result) = completions.recv() => {
                    self.handle_completion(result);
                }

                () = async {
                    match wakeup {
                        Some(at) => tokio::time::sleep_until(at).await,
                        None => std::future::pending().await,
                    }
                } => {
                    let outputs = self.machine.tick(self.now_ms());
                    self.process_outputs(outputs);
                }
            }

            self.publish_state();
        }

        info!(
            group_id = %self.machine.config().group_id,
            status = %self.machine.status(),
            "membership driver stopped"
        );
    }

    fn handle_command(&mut self, cmd: Command) {
        let now_ms = self.now_ms();
        match cmd {
            Command::Subscribe { topics, response } => {
                let result = self
                    .machine
                    .subscribe(topics, now_ms)
                    .map(|outputs| self.process_outputs(outputs));
                let _ = response.send(result);
            }
            Command::Poll { response } => {
                let delivery = self.machine.next_delivery();
                if let Err(Some(Delivery::Event(event))) = response.send(delivery) {
                    debug!(
                        group_id = %self.machine.config().group_id,
                        event = %event,
                        "poll caller went away, event will be offered again"
                    );
                }
            }
            Command::Acknowledge => {
                let outputs = self.machine.acknowledge(now_ms);
                self.process_outputs(outputs);
            }
            Command::BeginClose { response } => {
                let event = self.machine.begin_close(now_ms);
                let _ = response.send(event);
            }
            Command::Leave { response } => {
                let outputs = self.machine.leave_group(now_ms);
                self.process_outputs(outputs);
                self.close_waiters.push(response);
            }
            Command::Snapshot { response } => {
                let _ = response.send(self.snapshot());
            }
        }
    }

    fn handle_completion(&mut self, result: TransportResult<HeartbeatResponse>) {
        let now_ms = self.now_ms();
        let outputs = match result {
            Ok(response) => {
                debug!(
                    group_id = %self.machine.config().group_id,
                    error_code = %response.error_code,
                    epoch = %response.member_epoch,
                    "heartbeat response received"
                );
                self.machine.handle_response(response, now_ms)
            }
            Err(err) => {
                self.machine
                    .handle_failure(err.error_code(), Some(err.to_string()), now_ms)
            }
        };
        self.process_outputs(outputs);
    }

    fn process_outputs(&mut self, outputs: Vec<MembershipOutput>) {
        for output in outputs {
            match output {
                MembershipOutput::SendHeartbeat(request) => self.spawn_heartbeat(request),
                MembershipOutput::Diagnostic(diagnostic) => {
                    if self.diagnostics.try_send(diagnostic).is_err() {
                        debug!(
                            group_id = %self.machine.config().group_id,
                            "diagnostics channel full, dropping diagnostic"
                        );
                    }
                }
                MembershipOutput::FatalRaised(_) => self.ready.notify_one(),
                MembershipOutput::CloseCompleted(_) => {}
            }
        }
    }

    fn spawn_heartbeat(&self, request: HeartbeatRequest) {
        let transport = self.transport.clone();
        let completions = self.completions.clone();
        let timeout = self.request_timeout;

        tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, transport.heartbeat(request)).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout {
                    after_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                }),
            };
            // The driver is gone if this fails; the outcome no longer matters.
            let _ = completions.send(result).await;
        });
    }

    fn publish_state(&mut self) {
        if self.machine.has_delivery() {
            self.ready.notify_one();
        }
        if self.close_waiters.is_empty() {
            return;
        }
        if let Some(outcome) = self.machine.close_result() {
            for waiter in self.close_waiters.drain(..) {
                let _ = waiter.send(outcome.clone());
            }
        }
    }

    fn snapshot(&self) -> MembershipSnapshot {
        MembershipSnapshot {
            status: self.machine.status(),
            member_id: self.machine.member_id().clone(),
            member_epoch: self.machine.member_epoch(),
            assignment: self.machine.assignment().clone(),
            heartbeats_sent: self.machine.heartbeats_sent(),
            events_delivered: self.machine.events_delivered(),
        }
    }
}

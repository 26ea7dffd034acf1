//! Membership state machine.
//!
//! Owns the member identity, the assignment and the heartbeat schedule of one
//! group membership. Inputs are application calls (`subscribe`, delivery,
//! close) and heartbeat outcomes; outputs are the actions the runtime must
//! perform. No I/O happens here and no clock is read.

use std::fmt;

use tether_core::{Error, MemberEpoch, MemberId, PartitionSet, Result};
use tracing::{debug, error, info, warn};

use crate::assignment::AssignmentStore;
use crate::classifier::{classify, ErrorCategory};
use crate::config::MembershipConfig;
use crate::error::FatalError;
use crate::message::{Diagnostic, HeartbeatRequest, HeartbeatResponse};
use crate::rebalance::{RebalanceCoordinator, RebalanceEvent};
use crate::scheduler::HeartbeatScheduler;

/// Lifecycle status of a membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MembershipStatus {
    /// Not subscribed, or closed.
    #[default]
    Unjoined,
    /// Waiting for the first successful heartbeat of a (re)join.
    Joining,
    /// Joined; the application holds the target assignment.
    Stable,
    /// Joined; the application has not yet been handed the target assignment.
    Reconciling,
    /// The coordinator fenced this member; waiting for the loss to be delivered.
    Fenced,
    /// Closing; the leave heartbeat is pending or in flight.
    LeavingGroup,
    /// Unrecoverable error; no heartbeat is ever sent again.
    Fatal,
}

impl MembershipStatus {
    /// Returns the status name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unjoined => "unjoined",
            Self::Joining => "joining",
            Self::Stable => "stable",
            Self::Reconciling => "reconciling",
            Self::Fenced => "fenced",
            Self::LeavingGroup => "leaving",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions the runtime must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipOutput {
    /// Send this heartbeat and feed the outcome back.
    SendHeartbeat(HeartbeatRequest),
    /// A retriable error was absorbed. Report it without blocking.
    Diagnostic(Diagnostic),
    /// The membership failed permanently.
    FatalRaised(FatalError),
    /// Close finished with this outcome.
    CloseCompleted(std::result::Result<(), FatalError>),
}

/// What one poll hands to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// A rebalance event.
    Event(RebalanceEvent),
    /// The terminal error, delivered once.
    Fatal(FatalError),
}

/// What the outstanding heartbeat carried.
#[derive(Debug, Clone)]
struct InFlight {
    leave: bool,
    subscription: Option<Vec<String>>,
    owned: Option<PartitionSet>,
}

#[derive(Debug, Clone, Default)]
struct CloseState {
    /// Set once the leave heartbeat may be sent.
    deadline_ms: Option<u64>,
    outcome: Option<std::result::Result<(), FatalError>>,
}

/// Client-side group membership.
///
/// This is a pure state machine - it takes inputs and produces outputs
/// but does not perform I/O itself. The runtime calls `tick` whenever
/// `next_wakeup_ms` is reached and after every application call.
#[derive(Debug)]
pub struct MembershipStateMachine {
    config: MembershipConfig,
    status: MembershipStatus,

    // Identity.
    member_id: MemberId,
    member_epoch: MemberEpoch,

    // Subscription, sorted and deduplicated.
    subscription: Vec<String>,
    /// Last subscription the coordinator acknowledged.
    acked_subscription: Option<Vec<String>>,
    /// Last owned set the coordinator acknowledged.
    acked_owned: Option<PartitionSet>,

    store: AssignmentStore,
    rebalance: RebalanceCoordinator,
    scheduler: HeartbeatScheduler,
    in_flight: Option<InFlight>,

    fatal: Option<FatalError>,
    fatal_surfaced: bool,
    close: Option<CloseState>,

    heartbeats_sent: u64,
}

impl MembershipStateMachine {
    /// Creates an unjoined membership.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: MembershipConfig) -> Result<Self> {
        config.validate()?;
        let scheduler = HeartbeatScheduler::new(
            config.heartbeat_interval_ms,
            config.retry_backoff_ms,
            config.retry_limit,
        );
        Ok(Self {
            config,
            status: MembershipStatus::Unjoined,
            member_id: MemberId::default(),
            member_epoch: MemberEpoch::JOIN,
            subscription: Vec::new(),
            acked_subscription: None,
            acked_owned: None,
            store: AssignmentStore::new(),
            rebalance: RebalanceCoordinator::new(),
            scheduler,
            in_flight: None,
            fatal: None,
            fatal_surfaced: false,
            close: None,
            heartbeats_sent: 0,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &MembershipConfig {
        &self.config
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> MembershipStatus {
        self.status
    }

    /// Returns the member id; empty until the coordinator assigns one.
    #[must_use]
    pub const fn member_id(&self) -> &MemberId {
        &self.member_id
    }

    /// Returns the member epoch.
    #[must_use]
    pub const fn member_epoch(&self) -> MemberEpoch {
        self.member_epoch
    }

    /// Returns the subscribed topics.
    #[must_use]
    pub fn subscription(&self) -> &[String] {
        &self.subscription
    }

    /// Partitions the application holds.
    #[must_use]
    pub const fn assignment(&self) -> &PartitionSet {
        self.store.current()
    }

    /// Partitions the coordinator wants this member to hold.
    #[must_use]
    pub const fn target_assignment(&self) -> &PartitionSet {
        self.store.target()
    }

    /// Returns the scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &HeartbeatScheduler {
        &self.scheduler
    }

    /// Returns the fatal error, if one occurred.
    #[must_use]
    pub const fn fatal_error(&self) -> Option<&FatalError> {
        self.fatal.as_ref()
    }

    /// Returns true once close has begun.
    #[must_use]
    pub const fn is_closing(&self) -> bool {
        self.close.is_some()
    }

    /// Returns the close outcome once close has finished.
    #[must_use]
    pub fn close_result(&self) -> Option<std::result::Result<(), FatalError>> {
        self.close.as_ref().and_then(|c| c.outcome.clone())
    }

    /// Number of heartbeats handed to the runtime.
    #[must_use]
    pub const fn heartbeats_sent(&self) -> u64 {
        self.heartbeats_sent
    }

    /// Number of rebalance events the application has finished with.
    #[must_use]
    pub const fn events_delivered(&self) -> u64 {
        self.rebalance.delivered()
    }

    /// Returns true if `next_delivery` would hand something out.
    #[must_use]
    pub fn has_delivery(&self) -> bool {
        if self.close.is_some() {
            return false;
        }
        self.rebalance
            .has_pending(&self.store, self.reconcile_enabled())
            || (self.fatal.is_some() && !self.fatal_surfaced)
    }

    /// Earliest time at which `tick` has work to do.
    #[must_use]
    pub fn next_wakeup_ms(&self) -> Option<u64> {
        let heartbeat = if self.heartbeats_enabled() {
            self.scheduler.next_wakeup_ms()
        } else {
            None
        };
        let deadline = match (&self.close, self.status) {
            (Some(close), MembershipStatus::LeavingGroup) => close.deadline_ms,
            _ => None,
        };
        match (heartbeat, deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Subscribes to `topics`, replacing any previous subscription.
    ///
    /// Joins the group if not yet joined. Either way a heartbeat carrying the
    /// new subscription goes out as soon as none is in flight.
    ///
    /// # Errors
    /// Returns an error if the membership is closing or failed, or the topic
    /// list is empty or too large.
    pub fn subscribe<I, S>(&mut self, topics: I, now_ms: u64) -> Result<Vec<MembershipOutput>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.status == MembershipStatus::Fatal {
            return Err(Error::InvalidState {
                current: self.status.as_str(),
                required: "a live membership",
            });
        }
        if self.close.is_some() {
            return Err(Error::InvalidState {
                current: "closed",
                required: "an open membership",
            });
        }

        let mut topics: Vec<String> = topics.into_iter().map(Into::into).collect();
        topics.sort();
        topics.dedup();
        if topics.is_empty() {
            return Err(Error::InvalidArgument {
                name: "topics",
                reason: "must not be empty",
            });
        }
        if topics.iter().any(String::is_empty) {
            return Err(Error::InvalidArgument {
                name: "topics",
                reason: "topic names must not be empty",
            });
        }
        if topics.len() > self.config.limits.max_subscription_topics {
            return Err(Error::LimitExceeded {
                limit: "max_subscription_topics",
                max: self.config.limits.max_subscription_topics as u64,
                actual: topics.len() as u64,
            });
        }

        info!(
            group_id = %self.config.group_id,
            topics = ?topics,
            "subscribing"
        );
        self.subscription = topics;
        if self.status == MembershipStatus::Unjoined {
            self.transition(MembershipStatus::Joining);
        }
        // A fenced member rejoins once the loss is delivered.
        if self.status != MembershipStatus::Fenced {
            self.scheduler.trigger_now(now_ms);
        }
        Ok(self.tick(now_ms))
    }

    /// Advances timers: sends a due heartbeat, enforces the close deadline.
    pub fn tick(&mut self, now_ms: u64) -> Vec<MembershipOutput> {
        let mut outputs = Vec::new();

        if self.status == MembershipStatus::LeavingGroup {
            if let Some(deadline_ms) = self.close.as_ref().and_then(|c| c.deadline_ms) {
                if now_ms >= deadline_ms {
                    warn!(
                        group_id = %self.config.group_id,
                        member_id = %self.member_id,
                        "leave heartbeat did not complete before close timeout"
                    );
                    self.finish_close(Ok(()), &mut outputs);
                    return outputs;
                }
                if !self.scheduler.in_flight() && self.member_id.is_empty() {
                    // The coordinator does not know this member; nothing to leave.
                    self.finish_close(Ok(()), &mut outputs);
                    return outputs;
                }
            }
        }

        if self.heartbeats_enabled() && self.scheduler.is_due(now_ms) {
            outputs.push(MembershipOutput::SendHeartbeat(self.next_request()));
        }
        outputs
    }

    /// Feeds back the outcome of the outstanding heartbeat.
    pub fn handle_response(
        &mut self,
        response: HeartbeatResponse,
        now_ms: u64,
    ) -> Vec<MembershipOutput> {
        let mut outputs = Vec::new();
        let Some(in_flight) = self.in_flight.take() else {
            debug!(
                group_id = %self.config.group_id,
                "ignoring heartbeat response with nothing in flight"
            );
            return outputs;
        };

        if matches!(
            self.status,
            MembershipStatus::Unjoined | MembershipStatus::Fatal
        ) {
            debug!(
                group_id = %self.config.group_id,
                status = %self.status,
                error_code = %response.error_code,
                "ignoring late heartbeat response"
            );
            self.scheduler.on_abandoned();
            return outputs;
        }

        let code = response.error_code;
        match classify(code) {
            ErrorCategory::Ignorable => self.on_success(response, in_flight, now_ms, &mut outputs),
            ErrorCategory::Retriable => {
                self.on_retriable(&response, &in_flight, now_ms, &mut outputs);
            }
            ErrorCategory::Fenced => self.on_fenced(&response, now_ms),
            ErrorCategory::Fatal => self.on_fatal(response, &mut outputs),
        }

        outputs.extend(self.tick(now_ms));
        outputs
    }

    /// Feeds back a heartbeat that failed without a response.
    pub fn handle_failure(
        &mut self,
        code: tether_core::ErrorCode,
        message: Option<String>,
        now_ms: u64,
    ) -> Vec<MembershipOutput> {
        let code = if code.is_none() {
            tether_core::ErrorCode::Transport
        } else {
            code
        };
        let response = HeartbeatResponse {
            error_code: code,
            error_message: message,
            ..HeartbeatResponse::default()
        };
        self.handle_response(response, now_ms)
    }

    /// Hands out at most one rebalance event, or the fatal error once.
    ///
    /// A waiting loss goes first, then pending reconciliation (revoke before
    /// assign), then the fatal error. The owned set is untouched until
    /// `acknowledge`; an event handed out but never acknowledged is handed
    /// out again.
    pub fn next_delivery(&mut self) -> Option<Delivery> {
        if self.close.is_some() {
            return None;
        }

        let reconcile = self.reconcile_enabled();
        if let Some(event) = self.rebalance.next_event(&self.store, reconcile) {
            debug!(
                group_id = %self.config.group_id,
                member_id = %self.member_id,
                event = %event,
                "handing out rebalance event"
            );
            return Some(Delivery::Event(event));
        }

        match &self.fatal {
            Some(err) if !self.fatal_surfaced => {
                self.fatal_surfaced = true;
                Some(Delivery::Fatal(err.clone()))
            }
            _ => None,
        }
    }

    /// Records that the application finished with the handed-out event.
    ///
    /// Only now does the owned set change, and only now does a heartbeat
    /// reporting it become due (or, after a loss, the rejoin).
    pub fn acknowledge(&mut self, now_ms: u64) -> Vec<MembershipOutput> {
        if self.close.is_some() {
            return Vec::new();
        }
        let Some(event) = self.rebalance.acknowledge(&mut self.store) else {
            return Vec::new();
        };
        info!(
            group_id = %self.config.group_id,
            member_id = %self.member_id,
            event = %event,
            owned = %self.store.current(),
            "rebalance event acknowledged"
        );
        self.after_acknowledge(&event, now_ms);
        self.tick(now_ms)
    }

    /// First step of close: hands out the final event, if any.
    ///
    /// Held partitions are revoked, or reported lost when the membership is
    /// fenced or failed. Call `leave_group` once the application has seen the
    /// event. Repeated calls return `None`.
    pub fn begin_close(&mut self, now_ms: u64) -> Option<RebalanceEvent> {
        if self.close.is_some() {
            return None;
        }
        info!(
            group_id = %self.config.group_id,
            member_id = %self.member_id,
            status = %self.status,
            now_ms,
            "closing membership"
        );
        self.close = Some(CloseState::default());

        match self.status {
            MembershipStatus::Fatal => {
                let event = self.rebalance.final_event(&mut self.store, true);
                self.fatal_surfaced = true;
                let outcome = self.fatal.clone().map_or(Ok(()), Err);
                self.finish_close(outcome, &mut Vec::new());
                event
            }
            MembershipStatus::Unjoined => {
                self.finish_close(Ok(()), &mut Vec::new());
                None
            }
            _ => {
                let event = self.rebalance.final_event(&mut self.store, false);
                self.transition(MembershipStatus::LeavingGroup);
                event
            }
        }
    }

    /// Second step of close: sends the leave heartbeat.
    ///
    /// Waits for an outstanding heartbeat first. The close deadline starts
    /// now. Does nothing unless `begin_close` left the membership leaving.
    pub fn leave_group(&mut self, now_ms: u64) -> Vec<MembershipOutput> {
        if self.status != MembershipStatus::LeavingGroup {
            return Vec::new();
        }
        let Some(close) = self.close.as_mut() else {
            return Vec::new();
        };
        if close.deadline_ms.is_some() {
            return Vec::new();
        }
        close.deadline_ms = Some(now_ms.saturating_add(self.config.close_timeout_ms));
        self.scheduler.trigger_now(now_ms);
        self.tick(now_ms)
    }

    fn heartbeats_enabled(&self) -> bool {
        match self.status {
            MembershipStatus::Joining | MembershipStatus::Stable | MembershipStatus::Reconciling => {
                true
            }
            MembershipStatus::LeavingGroup => self
                .close
                .as_ref()
                .is_some_and(|c| c.deadline_ms.is_some() && !self.member_id.is_empty()),
            MembershipStatus::Unjoined | MembershipStatus::Fenced | MembershipStatus::Fatal => false,
        }
    }

    const fn reconcile_enabled(&self) -> bool {
        matches!(
            self.status,
            MembershipStatus::Joining
                | MembershipStatus::Stable
                | MembershipStatus::Reconciling
                | MembershipStatus::Fatal
        )
    }

    fn next_request(&mut self) -> HeartbeatRequest {
        let leave = self.status == MembershipStatus::LeavingGroup;
        let join = !leave && self.member_epoch.is_join();

        let subscription = (!leave
            && (join || self.acked_subscription.as_ref() != Some(&self.subscription)))
        .then(|| self.subscription.clone());
        let owned = (!leave && (join || self.acked_owned.as_ref() != Some(self.store.current())))
            .then(|| self.store.current().clone());
        let join_field = |field: &Option<String>| if join { field.clone() } else { None };

        let request = HeartbeatRequest {
            group_id: self.config.group_id.clone(),
            member_id: self.member_id.clone(),
            member_epoch: if leave {
                MemberEpoch::LEAVE
            } else {
                self.member_epoch
            },
            subscribed_topics: subscription.clone(),
            owned_partitions: owned.clone(),
            rebalance_timeout_ms: self.config.rebalance_timeout_ms,
            instance_id: join_field(&self.config.instance_id),
            rack_id: join_field(&self.config.rack_id),
            server_assignor: join_field(&self.config.server_assignor),
        };

        debug!(
            group_id = %request.group_id,
            member_id = %request.member_id,
            epoch = %request.member_epoch,
            join,
            leave,
            "sending heartbeat"
        );

        self.scheduler.on_sent();
        self.in_flight = Some(InFlight {
            leave,
            subscription,
            owned,
        });
        self.heartbeats_sent += 1;
        request
    }

    fn on_success(
        &mut self,
        response: HeartbeatResponse,
        in_flight: InFlight,
        now_ms: u64,
        outputs: &mut Vec<MembershipOutput>,
    ) {
        if in_flight.leave {
            self.scheduler.on_success(now_ms);
            info!(
                group_id = %self.config.group_id,
                member_id = %self.member_id,
                "left group"
            );
            self.finish_close(Ok(()), outputs);
            return;
        }

        if response.member_epoch < self.member_epoch {
            self.scheduler.on_success(now_ms);
            debug!(
                group_id = %self.config.group_id,
                received = %response.member_epoch,
                current = %self.member_epoch,
                "dropping stale heartbeat response"
            );
            return;
        }

        if let Some(member_id) = response.member_id.filter(|id| !id.is_empty()) {
            if member_id != self.member_id {
                info!(
                    group_id = %self.config.group_id,
                    member_id = %member_id,
                    "member id assigned"
                );
                self.member_id = member_id;
            }
        }
        self.member_epoch = response.member_epoch;

        if let Some(interval_ms) = response.heartbeat_interval_ms.filter(|ms| *ms > 0) {
            let interval_ms = self.config.limits.clamp_heartbeat_interval(interval_ms);
            if interval_ms != self.scheduler.interval_ms() {
                debug!(
                    group_id = %self.config.group_id,
                    interval_ms,
                    "heartbeat interval updated"
                );
                self.scheduler.set_interval_ms(interval_ms);
            }
        }
        self.scheduler.on_success(now_ms);

        if let Some(subscription) = in_flight.subscription {
            self.acked_subscription = Some(subscription);
        }
        if let Some(owned) = in_flight.owned {
            self.acked_owned = Some(owned);
        }

        debug!(
            group_id = %self.config.group_id,
            member_id = %self.member_id,
            epoch = %self.member_epoch,
            "heartbeat succeeded"
        );

        if self.status == MembershipStatus::LeavingGroup {
            return;
        }

        if let Some(assignment) = response.assignment {
            if self.store.set_target(assignment) {
                info!(
                    group_id = %self.config.group_id,
                    member_id = %self.member_id,
                    epoch = %self.member_epoch,
                    target = %self.store.target(),
                    "new target assignment"
                );
            }
        }

        let next = if self.store.needs_reconcile() {
            MembershipStatus::Reconciling
        } else {
            MembershipStatus::Stable
        };
        self.transition(next);
    }

    fn on_retriable(
        &mut self,
        response: &HeartbeatResponse,
        in_flight: &InFlight,
        now_ms: u64,
        outputs: &mut Vec<MembershipOutput>,
    ) {
        let retry_in_ms = self.scheduler.on_retriable(now_ms);
        let attempt = self.scheduler.consecutive_retries();
        warn!(
            group_id = %self.config.group_id,
            member_id = %self.member_id,
            error_code = %response.error_code,
            attempt,
            retry_in_ms,
            leave = in_flight.leave,
            "retriable heartbeat error"
        );
        outputs.push(MembershipOutput::Diagnostic(Diagnostic {
            code: response.error_code,
            message: response.error_message.clone(),
            attempt,
            retry_in_ms,
            at_ms: now_ms,
        }));
    }

    fn on_fenced(&mut self, response: &HeartbeatResponse, now_ms: u64) {
        self.scheduler.on_abandoned();
        warn!(
            group_id = %self.config.group_id,
            member_id = %self.member_id,
            epoch = %self.member_epoch,
            error_code = %response.error_code,
            "member fenced"
        );
        self.reset_identity();

        if self.status == MembershipStatus::LeavingGroup {
            // Partitions were already revoked; close completes without a leave.
            return;
        }

        self.store.clear_target();
        // An outstanding event is still acknowledged first; the loss covers
        // what the application holds after it.
        let held = self.rebalance.held_after_outstanding(&self.store);
        self.rebalance.queue_lost(held);
        if self.rebalance.has_queued_lost() {
            self.transition(MembershipStatus::Fenced);
            self.scheduler.suspend();
        } else {
            self.transition(MembershipStatus::Joining);
            self.scheduler.trigger_now(now_ms);
        }
    }

    fn on_fatal(&mut self, response: HeartbeatResponse, outputs: &mut Vec<MembershipOutput>) {
        self.scheduler.on_abandoned();
        self.scheduler.suspend();

        let err = FatalError::new(response.error_code, response.error_message);
        error!(
            group_id = %self.config.group_id,
            member_id = %self.member_id,
            error_code = %err.code,
            message = %err.message,
            "fatal heartbeat error"
        );

        let closing = self.status == MembershipStatus::LeavingGroup;
        self.fatal = Some(err.clone());
        self.transition(MembershipStatus::Fatal);
        outputs.push(MembershipOutput::FatalRaised(err.clone()));

        if closing {
            self.fatal_surfaced = true;
            self.finish_close(Err(err), outputs);
        }
    }

    fn after_acknowledge(&mut self, event: &RebalanceEvent, now_ms: u64) {
        match self.status {
            MembershipStatus::Fenced => {
                if event.is_lost() && !self.rebalance.has_queued_lost() {
                    self.transition(MembershipStatus::Joining);
                    self.scheduler.trigger_now(now_ms);
                }
            }
            MembershipStatus::Joining | MembershipStatus::Stable | MembershipStatus::Reconciling => {
                // Report the new owned set right away.
                self.scheduler.trigger_now(now_ms);
                if self.status == MembershipStatus::Reconciling && !self.store.needs_reconcile() {
                    self.transition(MembershipStatus::Stable);
                }
            }
            MembershipStatus::Unjoined
            | MembershipStatus::LeavingGroup
            | MembershipStatus::Fatal => {}
        }
    }

    fn finish_close(
        &mut self,
        outcome: std::result::Result<(), FatalError>,
        outputs: &mut Vec<MembershipOutput>,
    ) {
        if self.status != MembershipStatus::Fatal {
            self.transition(MembershipStatus::Unjoined);
        }
        self.scheduler.suspend();
        info!(
            group_id = %self.config.group_id,
            ok = outcome.is_ok(),
            heartbeats_sent = self.heartbeats_sent,
            events_delivered = self.rebalance.delivered(),
            "membership closed"
        );
        self.close.get_or_insert_with(CloseState::default).outcome = Some(outcome.clone());
        outputs.push(MembershipOutput::CloseCompleted(outcome));
    }

    fn reset_identity(&mut self) {
        self.member_id = MemberId::default();
        self.member_epoch = MemberEpoch::JOIN;
        self.acked_subscription = None;
        self.acked_owned = None;
    }

    fn transition(&mut self, to: MembershipStatus) {
        if self.status == to {
            return;
        }
        info!(
            group_id = %self.config.group_id,
            member_id = %self.member_id,
            epoch = %self.member_epoch,
            from = %self.status,
            to = %to,
            "membership status changed"
        );
        self.status = to;
    }
}

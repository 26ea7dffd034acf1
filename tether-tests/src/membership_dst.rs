//! Deterministic simulation of the membership state machine.
//!
//! A seeded RNG plays both the coordinator and the application: it answers
//! heartbeats with successes, new assignments, stale epochs and injected
//! errors, polls at random moments (now and then abandoning a poll before
//! the listener runs), advances a virtual clock and eventually closes.
//! Properties are checked after every run.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tether_core::{ErrorCode, MemberEpoch, PartitionSet, TopicPartition};
use tether_membership::{
    Delivery, HeartbeatRequest, HeartbeatResponse, MembershipConfig, MembershipOutput,
    MembershipStateMachine, MembershipStatus,
};

use crate::properties::InvariantChecker;
use crate::scenarios::{codes, seeds};

/// Test configuration for simulation runs.
struct SimulationTestConfig {
    /// Random seed for determinism.
    seed: u64,
    /// Number of random steps before closing.
    steps: u32,
    /// Probability (percent) that a response carries a fatal error.
    fatal_percent: u32,
    /// Partitions of the simulated topic.
    partitions: i32,
}

impl Default for SimulationTestConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            steps: 2_000,
            fatal_percent: 1,
            partitions: 6,
        }
    }
}

/// Outcome of one run, for assertions beyond the invariants.
#[derive(Debug, Default)]
struct SimulationReport {
    heartbeats: usize,
    events: usize,
    fenced: u32,
    cancelled_polls: u32,
    fatal: bool,
    close_ok: bool,
}

struct Simulation {
    config: SimulationTestConfig,
    rng: ChaCha8Rng,
    machine: MembershipStateMachine,
    checker: InvariantChecker,
    now_ms: u64,
    in_flight: Option<HeartbeatRequest>,
    sent: Vec<HeartbeatRequest>,
    coordinator_epoch: i32,
    fenced: u32,
    cancelled_polls: u32,
}

impl Simulation {
    fn new(config: SimulationTestConfig) -> Self {
        let membership = MembershipConfig::new("dst-group")
            .with_heartbeat_interval_ms(200)
            .with_retry(20, 3)
            .with_close_timeout_ms(1_000);
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            machine: MembershipStateMachine::new(membership).unwrap(),
            checker: InvariantChecker::new(),
            now_ms: 0,
            in_flight: None,
            sent: Vec::new(),
            coordinator_epoch: 0,
            fenced: 0,
            cancelled_polls: 0,
            config,
        }
    }

    fn process(&mut self, outputs: Vec<MembershipOutput>) {
        for output in outputs {
            if let MembershipOutput::SendHeartbeat(request) = output {
                assert!(
                    self.in_flight.is_none(),
                    "seed {}: second heartbeat while one is in flight",
                    self.config.seed
                );
                assert_ne!(
                    self.machine.status(),
                    MembershipStatus::Fatal,
                    "seed {}: heartbeat sent after fatal",
                    self.config.seed
                );
                self.checker.record_heartbeat(self.sent.len(), &request);
                self.sent.push(request.clone());
                self.in_flight = Some(request);
            }
        }
    }

    fn random_assignment(&mut self) -> PartitionSet {
        (0..self.config.partitions)
            .filter(|_| self.rng.gen_bool(0.5))
            .map(|p| TopicPartition::new("orders", p))
            .collect()
    }

    fn success(&mut self, request: &HeartbeatRequest) -> HeartbeatResponse {
        if request.is_leave() {
            return HeartbeatResponse::ok(request.member_id.clone(), MemberEpoch::LEAVE);
        }
        if request.is_join() || self.rng.gen_bool(0.2) {
            self.coordinator_epoch += 1;
        }
        let mut epoch = self.coordinator_epoch;
        if !request.is_join() && self.rng.gen_bool(0.05) {
            // Late response from an older epoch.
            epoch -= 1;
        }
        let mut response = HeartbeatResponse::ok("dst-member", MemberEpoch::new(epoch))
            .with_heartbeat_interval_ms(self.rng.gen_range(50..400));
        if request.is_join() || self.rng.gen_bool(0.3) {
            response = response.with_assignment(self.random_assignment());
        }
        response
    }

    fn respond(&mut self) {
        let Some(request) = self.in_flight.take() else {
            return;
        };
        let roll = self.rng.gen_range(0..100);
        let outputs = if roll < self.config.fatal_percent {
            let code = *codes::FATAL.choose(&mut self.rng).unwrap();
            self.machine
                .handle_response(HeartbeatResponse::error(code), self.now_ms)
        } else if roll < 15 {
            let code = *codes::RETRIABLE.choose(&mut self.rng).unwrap();
            if code.is_local() {
                self.machine.handle_failure(code, None, self.now_ms)
            } else {
                self.machine
                    .handle_response(HeartbeatResponse::error(code), self.now_ms)
            }
        } else if roll < 22 {
            self.fenced += 1;
            let code = *codes::FENCED.choose(&mut self.rng).unwrap();
            self.machine
                .handle_response(HeartbeatResponse::error(code), self.now_ms)
        } else {
            let response = self.success(&request);
            self.machine.handle_response(response, self.now_ms)
        };
        self.process(outputs);
    }

    fn poll(&mut self) {
        match self.machine.next_delivery() {
            // The poll was cancelled before the listener ran; the event
            // stays outstanding and comes back on the next poll.
            Some(Delivery::Event(_)) if self.rng.gen_bool(0.1) => self.cancelled_polls += 1,
            Some(Delivery::Event(event)) => {
                self.checker.record_event(&event);
                let outputs = self.machine.acknowledge(self.now_ms);
                self.process(outputs);
            }
            Some(Delivery::Fatal(_)) => self.checker.record_fatal(self.sent.len()),
            None => {}
        }
    }

    fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
        let outputs = self.machine.tick(self.now_ms);
        self.process(outputs);
    }

    fn close(&mut self) -> bool {
        if let Some(event) = self.machine.begin_close(self.now_ms) {
            self.checker.record_event(&event);
        }
        let outputs = self.machine.leave_group(self.now_ms);
        self.process(outputs);

        for _ in 0..1_000 {
            if let Some(outcome) = self.machine.close_result() {
                return outcome.is_ok();
            }
            if self.in_flight.is_some() && self.rng.gen_bool(0.7) {
                self.respond();
            } else {
                let ms = self.rng.gen_range(1..100);
                self.advance(ms);
            }
        }
        panic!("seed {}: close did not complete", self.config.seed);
    }

    fn run(mut self) -> SimulationReport {
        let subscribe = self.machine.subscribe(["orders"], self.now_ms).unwrap();
        self.process(subscribe);

        for _ in 0..self.config.steps {
            match self.rng.gen_range(0..100) {
                0..=39 => self.respond(),
                40..=69 => self.poll(),
                _ => {
                    let ms = self.rng.gen_range(0..300);
                    self.advance(ms);
                }
            }
        }

        let close_ok = self.close();
        let fatal = self.machine.fatal_error().is_some();
        assert_eq!(close_ok, !fatal, "seed {}", self.config.seed);
        assert!(
            self.machine.assignment().is_empty(),
            "seed {}: partitions held after close",
            self.config.seed
        );
        assert!(self.checker.held().is_empty(), "seed {}", self.config.seed);
        assert!(self.machine.next_delivery().is_none());

        self.checker.check_requests(&self.sent);
        self.checker.assert_ok();
        assert_eq!(
            self.checker.events().len() as u64,
            self.machine.events_delivered(),
            "seed {}",
            self.config.seed
        );

        SimulationReport {
            heartbeats: self.sent.len(),
            events: self.checker.events().len(),
            fenced: self.fenced,
            cancelled_polls: self.cancelled_polls,
            fatal,
            close_ok,
        }
    }
}

fn run_simulation(config: SimulationTestConfig) -> SimulationReport {
    Simulation::new(config).run()
}

#[test]
fn test_dst_membership_default_seed() {
    let report = run_simulation(SimulationTestConfig::default());
    assert!(report.heartbeats > 0);
}

#[test]
fn test_dst_membership_regression_seeds() {
    for &seed in seeds::REGRESSION_SEEDS {
        let report = run_simulation(SimulationTestConfig {
            seed,
            ..SimulationTestConfig::default()
        });
        assert!(report.heartbeats > 0, "seed {seed}");
    }
}

#[test]
fn test_dst_membership_random_seeds() {
    let mut fenced_runs = 0;
    let mut fatal_runs = 0;
    let mut cancelled_polls = 0;
    for seed in 0..u64::from(seeds::CI_SEED_COUNT) {
        let report = run_simulation(SimulationTestConfig {
            seed: seed.wrapping_mul(0x9E37_79B9_7F4A_7C15),
            steps: 500,
            ..SimulationTestConfig::default()
        });
        if report.fenced > 0 {
            fenced_runs += 1;
        }
        if report.fatal {
            fatal_runs += 1;
        }
        cancelled_polls += report.cancelled_polls;
    }
    // The fault mix actually exercised both recovery paths.
    assert!(fenced_runs > 0);
    assert!(fatal_runs > 0);
    assert!(cancelled_polls > 0);
}

#[test]
fn test_dst_membership_without_fatal_always_closes_cleanly() {
    for &seed in seeds::REGRESSION_SEEDS {
        let report = run_simulation(SimulationTestConfig {
            seed,
            fatal_percent: 0,
            ..SimulationTestConfig::default()
        });
        assert!(report.close_ok, "seed {seed}");
        assert!(!report.fatal, "seed {seed}");
        assert!(report.events > 0, "seed {seed}");
    }
}

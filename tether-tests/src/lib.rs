//! Tether Tests - Scenario and deterministic simulation tests for tether.
//!
//! Tests are organized by type:
//!
//! **DST Tests** (`*_dst.rs`): Deterministic simulation with fault injection
//! - `membership_dst`: seeded random heartbeat outcomes driven straight into
//!   the sans-IO state machine on a virtual clock
//!
//! **Integration Tests** (`*_tests.rs`): End-to-end through `GroupConsumer`
//! - `heartbeat_error_tests`: every fatal, retriable and fencing error code,
//!   injected on the first or second heartbeat, on tokio's paused clock
//!
//! **Support Modules**:
//! - `mock_coordinator`: in-memory coordinator with scripted error injection
//! - `properties`: membership properties and the `InvariantChecker`
//! - `scenarios`: error-code groups, variations and seeds
//!
//! ## Naming Conventions
//!
//! - DST tests: `test_dst_<component>_<scenario>`
//! - Integration tests: `test_<component>_<scenario>`
//! - Unit tests: Inline in each crate under `#[cfg(test)]`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod mock_coordinator;
pub mod properties;
pub mod scenarios;

// DST test modules (deterministic simulation with fault injection).
#[cfg(test)]
mod membership_dst;

// Integration test modules.
#[cfg(test)]
mod heartbeat_error_tests;

//! Tether Core - Strongly-typed identifiers, error codes and limits.
//!
//! This crate holds the vocabulary shared by the membership state machine
//! and the runtime that drives it. It performs no I/O and reads no clocks.
//!
//! # Design Principles
//!
//! - **Strongly-typed IDs**: a `MemberEpoch` cannot be confused with a partition index
//! - **Total error table**: every `i16` maps to exactly one `ErrorCode`
//! - **Explicit limits**: every configurable bound has a validated maximum
//! - **No unsafe code**

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod error_code;
mod limits;
mod types;

pub use error::{Error, Result};
pub use error_code::ErrorCode;
pub use limits::Limits;
pub use types::{GroupId, MemberEpoch, MemberId, PartitionSet, TopicPartition};

//! Tether Client - Tokio runtime for consumer group membership.
//!
//! This crate drives a `tether_membership::MembershipStateMachine` on a
//! background task and exposes it through `GroupConsumer`. Heartbeats go out
//! through a `HeartbeatTransport`; `KafkaTransport` speaks the Kafka
//! `ConsumerGroupHeartbeat` API over TCP.
//!
//! # Example
//!
//! ```ignore
//! let transport = KafkaTransport::new(addr, "my-app", resolver);
//! let mut consumer = GroupConsumer::new(ClientConfig::new("orders"), transport, NoopListener)?;
//! consumer.subscribe(["orders"]).await?;
//! while let Some(event) = consumer.poll(Duration::from_millis(100)).await? {
//!     println!("{event}");
//! }
//! consumer.close().await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
mod config;
mod consumer;
mod driver;
mod error;
mod kafka;
mod listener;
mod transport;

pub use config::{ClientConfig, DIAGNOSTICS_CAPACITY_DEFAULT, REQUEST_TIMEOUT_MS_DEFAULT};
pub use consumer::GroupConsumer;
pub use driver::MembershipSnapshot;
pub use error::{ClientError, ClientResult, TransportError, TransportResult};
pub use kafka::{KafkaTransport, StaticTopicResolver, TopicResolver};
pub use listener::{NoopListener, RebalanceListener};
pub use transport::HeartbeatTransport;

//! `ConsumerGroupHeartbeat` over a Kafka TCP connection.
//!
//! The heartbeat protocol addresses topics by id while the membership engine
//! works with names. A `TopicResolver` maps between the two.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use kafka_protocol::{
    messages::{
        consumer_group_heartbeat_request, ConsumerGroupHeartbeatRequest,
        ConsumerGroupHeartbeatResponse, GroupId as WireGroupId, TopicName,
    },
    protocol::StrBytes,
};
use tether_core::{ErrorCode, MemberEpoch, MemberId, PartitionSet, TopicPartition};
use tether_membership::{HeartbeatRequest, HeartbeatResponse};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::codec::{
    decode_heartbeat_response, encode_heartbeat_request, split_frame, MAX_RESPONSE_BYTES_DEFAULT,
};
use crate::error::{TransportError, TransportResult};
use crate::transport::HeartbeatTransport;

/// Maps topic names to topic ids and back.
pub trait TopicResolver: Send + Sync + 'static {
    /// Returns the id of a topic.
    fn topic_id(&self, name: &str) -> Option<Uuid>;

    /// Returns the name of a topic id.
    fn topic_name(&self, id: Uuid) -> Option<String>;
}

/// A fixed topic table.
#[derive(Debug, Clone, Default)]
pub struct StaticTopicResolver {
    ids: HashMap<String, Uuid>,
    names: HashMap<Uuid, String>,
}

impl StaticTopicResolver {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a topic.
    #[must_use]
    pub fn with_topic(mut self, name: impl Into<String>, id: Uuid) -> Self {
        let name = name.into();
        self.names.insert(id, name.clone());
        self.ids.insert(name, id);
        self
    }
}

impl TopicResolver for StaticTopicResolver {
    fn topic_id(&self, name: &str) -> Option<Uuid> {
        self.ids.get(name).copied()
    }

    fn topic_name(&self, id: Uuid) -> Option<String> {
        self.names.get(&id).cloned()
    }
}

struct Connection {
    stream: TcpStream,
    read_buf: BytesMut,
}

struct Inner<R> {
    addr: SocketAddr,
    client_id: String,
    resolver: R,
    connection: Mutex<Option<Connection>>,
    next_correlation_id: AtomicI32,
}

/// Heartbeat transport speaking the Kafka wire protocol to one coordinator.
///
/// Connects lazily. A connection that failed, or whose exchange was
/// cancelled, is discarded and re-established on the next heartbeat.
pub struct KafkaTransport<R> {
    inner: Arc<Inner<R>>,
    max_response_bytes: usize,
}

impl<R> Clone for KafkaTransport<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            max_response_bytes: self.max_response_bytes,
        }
    }
}

impl<R: TopicResolver> KafkaTransport<R> {
    /// Creates a transport for the coordinator at `addr`.
    #[must_use]
    pub fn new(addr: SocketAddr, client_id: impl Into<String>, resolver: R) -> Self {
        Self {
            inner: Arc::new(Inner {
                addr,
                client_id: client_id.into(),
                resolver,
                connection: Mutex::new(None),
                next_correlation_id: AtomicI32::new(1),
            }),
            max_response_bytes: MAX_RESPONSE_BYTES_DEFAULT,
        }
    }

    /// Bounds the size of one heartbeat response frame.
    ///
    /// A larger response fails the exchange and drops the connection.
    #[must_use]
    pub const fn with_max_response_bytes(mut self, max_bytes: usize) -> Self {
        self.max_response_bytes = max_bytes;
        self
    }

    /// Returns the coordinator address.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.inner.addr
    }

    async fn exchange(&self, frame: &[u8]) -> TransportResult<Bytes> {
        let mut slot = self.inner.connection.lock().await;
        let mut conn = match slot.take() {
            Some(conn) => conn,
            None => {
                debug!(addr = %self.inner.addr, "connecting to coordinator");
                let stream = TcpStream::connect(self.inner.addr).await?;
                stream.set_nodelay(true)?;
                Connection {
                    stream,
                    read_buf: BytesMut::with_capacity(4096),
                }
            }
        };

        // The connection goes back into the slot only after a clean exchange.
        let payload = Self::round_trip(&mut conn, frame, self.max_response_bytes).await?;
        *slot = Some(conn);
        Ok(payload)
    }

    async fn round_trip(
        conn: &mut Connection,
        frame: &[u8],
        max_response_bytes: usize,
    ) -> TransportResult<Bytes> {
        conn.stream.write_all(frame).await?;
        conn.stream.flush().await?;
        loop {
            if let Some(payload) = split_frame(&mut conn.read_buf, max_response_bytes)? {
                return Ok(payload);
            }
            if conn.stream.read_buf(&mut conn.read_buf).await? == 0 {
                return Err(TransportError::ConnectionClosed);
            }
        }
    }

    fn to_wire(&self, request: &HeartbeatRequest) -> TransportResult<ConsumerGroupHeartbeatRequest> {
        let rebalance_timeout_ms =
            i32::try_from(request.rebalance_timeout_ms).map_err(TransportError::encode)?;

        let subscribed = request.subscribed_topics.as_ref().map(|topics| {
            topics
                .iter()
                .map(|name| TopicName(StrBytes::from_string(name.clone())))
                .collect::<Vec<_>>()
        });

        let owned = match &request.owned_partitions {
            None => None,
            Some(owned) => {
                let mut topics = Vec::new();
                for (topic, partitions) in owned.by_topic() {
                    let topic_id = self.inner.resolver.topic_id(topic).ok_or_else(|| {
                        TransportError::UnknownTopic {
                            topic: topic.to_string(),
                        }
                    })?;
                    topics.push(
                        consumer_group_heartbeat_request::TopicPartitions::default()
                            .with_topic_id(topic_id)
                            .with_partitions(partitions),
                    );
                }
                Some(topics)
            }
        };

        Ok(ConsumerGroupHeartbeatRequest::default()
            .with_group_id(WireGroupId(StrBytes::from_string(
                request.group_id.as_str().to_string(),
            )))
            .with_member_id(StrBytes::from_string(request.member_id.as_str().to_string()))
            .with_member_epoch(request.member_epoch.get())
            .with_instance_id(request.instance_id.clone().map(StrBytes::from_string))
            .with_rack_id(request.rack_id.clone().map(StrBytes::from_string))
            .with_rebalance_timeout_ms(rebalance_timeout_ms)
            .with_subscribed_topic_names(subscribed)
            .with_server_assignor(request.server_assignor.clone().map(StrBytes::from_string))
            .with_topic_partitions(owned))
    }

    fn from_wire(&self, response: ConsumerGroupHeartbeatResponse) -> TransportResult<HeartbeatResponse> {
        let assignment = match response.assignment {
            None => None,
            Some(assignment) => {
                let mut set = PartitionSet::new();
                for topic in assignment.topic_partitions {
                    let name = self.inner.resolver.topic_name(topic.topic_id).ok_or(
                        TransportError::UnknownTopicId {
                            topic_id: topic.topic_id,
                        },
                    )?;
                    for partition in topic.partitions {
                        set.insert(TopicPartition::new(name.clone(), partition));
                    }
                }
                Some(set)
            }
        };

        Ok(HeartbeatResponse {
            error_code: ErrorCode::from(response.error_code),
            error_message: response.error_message.map(|m| m.to_string()),
            member_id: response
                .member_id
                .map(|id| id.to_string())
                .filter(|id| !id.is_empty())
                .map(MemberId::from),
            member_epoch: MemberEpoch::new(response.member_epoch),
            heartbeat_interval_ms: u64::try_from(response.heartbeat_interval_ms)
                .ok()
                .filter(|ms| *ms > 0),
            assignment,
        })
    }
}

#[async_trait]
impl<R: TopicResolver> HeartbeatTransport for KafkaTransport<R> {
    async fn heartbeat(&self, request: HeartbeatRequest) -> TransportResult<HeartbeatResponse> {
        let wire = self.to_wire(&request)?;
        let correlation_id = self.inner.next_correlation_id.fetch_add(1, Ordering::Relaxed);
        let frame = encode_heartbeat_request(correlation_id, &self.inner.client_id, &wire)?;

        let payload = self.exchange(&frame).await.map_err(|e| {
            warn!(addr = %self.inner.addr, error = %e, "heartbeat exchange failed");
            e
        })?;

        let response = decode_heartbeat_response(payload, correlation_id)?;
        self.from_wire(response)
    }
}

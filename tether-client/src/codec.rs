//! `ConsumerGroupHeartbeat` wire codec.
//!
//! A frame is a 4-byte big-endian length followed by a header and a body.
//! `ConsumerGroupHeartbeat` is a flexible API from v0, so requests carry
//! header v2 (client id plus tagged fields) and responses header v1.
//!
//! The coordinator half (`decode_heartbeat_request`,
//! `encode_heartbeat_response`) lets tests stand up an in-process broker.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use kafka_protocol::{
    messages::{
        ConsumerGroupHeartbeatRequest, ConsumerGroupHeartbeatResponse, RequestHeader,
        ResponseHeader,
    },
    protocol::{Decodable, Encodable, StrBytes},
};

use crate::error::{TransportError, TransportResult};

/// API key of `ConsumerGroupHeartbeat`.
pub const CONSUMER_GROUP_HEARTBEAT_KEY: i16 = 68;

/// Version of `ConsumerGroupHeartbeat` this client speaks.
pub const CONSUMER_GROUP_HEARTBEAT_VERSION: i16 = 0;

/// Request header version of a flexible API.
pub const REQUEST_HEADER_VERSION: i16 = 2;

/// Response header version of a flexible API.
pub const RESPONSE_HEADER_VERSION: i16 = 1;

/// Default bound on one heartbeat response frame (1 MiB).
///
/// An assignment costs 16 bytes per topic and 4 per partition, so this
/// admits a few hundred thousand assigned partitions.
pub const MAX_RESPONSE_BYTES_DEFAULT: usize = 1024 * 1024;

const LENGTH_PREFIX: usize = 4;

/// Splits one complete frame off the front of `buf`.
///
/// Returns `None` until the whole frame has arrived, reserving room for the
/// rest of it.
///
/// # Errors
///
/// Returns `FrameTooLarge` if the frame announces more than `max_bytes`.
pub fn split_frame(buf: &mut BytesMut, max_bytes: usize) -> TransportResult<Option<Bytes>> {
    if buf.len() < LENGTH_PREFIX {
        return Ok(None);
    }
    let size = (&buf[..LENGTH_PREFIX]).get_u32() as usize;
    if size > max_bytes {
        return Err(TransportError::FrameTooLarge {
            size,
            max: max_bytes,
        });
    }

    let total = LENGTH_PREFIX + size;
    if buf.len() < total {
        buf.reserve(total - buf.len());
        return Ok(None);
    }
    buf.advance(LENGTH_PREFIX);
    Ok(Some(buf.split_to(size).freeze()))
}

fn frame(payload: &[u8]) -> TransportResult<BytesMut> {
    let size = u32::try_from(payload.len()).map_err(TransportError::encode)?;
    let mut out = BytesMut::with_capacity(LENGTH_PREFIX + payload.len());
    out.put_u32(size);
    out.put_slice(payload);
    Ok(out)
}

/// Encodes a heartbeat request into a complete frame.
///
/// # Errors
///
/// Returns an error if header or body encoding fails.
pub fn encode_heartbeat_request(
    correlation_id: i32,
    client_id: &str,
    request: &ConsumerGroupHeartbeatRequest,
) -> TransportResult<BytesMut> {
    let header = RequestHeader::default()
        .with_request_api_key(CONSUMER_GROUP_HEARTBEAT_KEY)
        .with_request_api_version(CONSUMER_GROUP_HEARTBEAT_VERSION)
        .with_correlation_id(correlation_id)
        .with_client_id(Some(StrBytes::from_string(client_id.to_string())));

    let mut payload = BytesMut::new();
    header
        .encode(&mut payload, REQUEST_HEADER_VERSION)
        .map_err(TransportError::encode)?;
    request
        .encode(&mut payload, CONSUMER_GROUP_HEARTBEAT_VERSION)
        .map_err(TransportError::encode)?;
    frame(&payload)
}

/// Decodes a heartbeat response payload, checking that it answers
/// `correlation_id`.
///
/// # Errors
///
/// Returns an error if decoding fails or the response answers a different
/// request.
pub fn decode_heartbeat_response(
    mut payload: Bytes,
    correlation_id: i32,
) -> TransportResult<ConsumerGroupHeartbeatResponse> {
    let header = ResponseHeader::decode(&mut payload, RESPONSE_HEADER_VERSION)
        .map_err(TransportError::decode)?;
    if header.correlation_id != correlation_id {
        return Err(TransportError::CorrelationMismatch {
            expected: correlation_id,
            actual: header.correlation_id,
        });
    }
    ConsumerGroupHeartbeatResponse::decode(&mut payload, CONSUMER_GROUP_HEARTBEAT_VERSION)
        .map_err(TransportError::decode)
}

/// A heartbeat request as the coordinator receives it.
#[derive(Debug)]
pub struct ReceivedHeartbeat {
    /// Correlation id to answer with.
    pub correlation_id: i32,
    /// Client id from the header.
    pub client_id: Option<String>,
    /// The request body.
    pub request: ConsumerGroupHeartbeatRequest,
}

/// Decodes a heartbeat request payload on the coordinator side.
///
/// # Errors
///
/// Returns an error if decoding fails or the frame carries another API.
pub fn decode_heartbeat_request(mut payload: Bytes) -> TransportResult<ReceivedHeartbeat> {
    let header = RequestHeader::decode(&mut payload, REQUEST_HEADER_VERSION)
        .map_err(TransportError::decode)?;
    if header.request_api_key != CONSUMER_GROUP_HEARTBEAT_KEY
        || header.request_api_version != CONSUMER_GROUP_HEARTBEAT_VERSION
    {
        return Err(TransportError::Decode {
            message: format!(
                "expected ConsumerGroupHeartbeat v{CONSUMER_GROUP_HEARTBEAT_VERSION}, got api {} v{}",
                header.request_api_key, header.request_api_version
            ),
        });
    }
    let request =
        ConsumerGroupHeartbeatRequest::decode(&mut payload, CONSUMER_GROUP_HEARTBEAT_VERSION)
            .map_err(TransportError::decode)?;

    Ok(ReceivedHeartbeat {
        correlation_id: header.correlation_id,
        client_id: header.client_id.map(|id| id.to_string()),
        request,
    })
}

/// Encodes a heartbeat response into a complete frame.
///
/// # Errors
///
/// Returns an error if header or body encoding fails.
pub fn encode_heartbeat_response(
    correlation_id: i32,
    response: &ConsumerGroupHeartbeatResponse,
) -> TransportResult<BytesMut> {
    let header = ResponseHeader::default().with_correlation_id(correlation_id);

    let mut payload = BytesMut::new();
    header
        .encode(&mut payload, RESPONSE_HEADER_VERSION)
        .map_err(TransportError::encode)?;
    response
        .encode(&mut payload, CONSUMER_GROUP_HEARTBEAT_VERSION)
        .map_err(TransportError::encode)?;
    frame(&payload)
}

#[cfg(test)]
mod tests {
    use kafka_protocol::messages::GroupId;

    use super::*;

    fn join() -> ConsumerGroupHeartbeatRequest {
        ConsumerGroupHeartbeatRequest::default()
            .with_group_id(GroupId(StrBytes::from_string("orders".to_string())))
            .with_member_epoch(0)
            .with_rebalance_timeout_ms(300_000)
    }

    #[test]
    fn test_partial_frame_waits_and_reserves() {
        let mut buf = BytesMut::new();
        buf.put_u32(64);
        buf.put_slice(b"epoch");

        assert_eq!(split_frame(&mut buf, 1024).unwrap(), None);
        assert_eq!(buf.len(), 9);
        assert!(buf.capacity() >= 68);
    }

    #[test]
    fn test_back_to_back_frames_split_in_order() {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&frame(b"first").unwrap());
        buf.extend_from_slice(&frame(b"second").unwrap());

        let max = MAX_RESPONSE_BYTES_DEFAULT;
        assert_eq!(
            split_frame(&mut buf, max).unwrap(),
            Some(Bytes::from_static(b"first"))
        );
        assert_eq!(
            split_frame(&mut buf, max).unwrap(),
            Some(Bytes::from_static(b"second"))
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_oversized_frame_rejected_before_buffering() {
        let mut buf = BytesMut::new();
        buf.put_u32(4_096);
        let err = split_frame(&mut buf, 1_024).unwrap_err();
        assert!(matches!(
            err,
            TransportError::FrameTooLarge {
                size: 4_096,
                max: 1_024
            }
        ));
    }

    #[test]
    fn test_request_reaches_coordinator_side_intact() {
        let mut frame = encode_heartbeat_request(7, "tether-test", &join()).unwrap();

        let payload = split_frame(&mut frame, MAX_RESPONSE_BYTES_DEFAULT)
            .unwrap()
            .unwrap();
        let received = decode_heartbeat_request(payload).unwrap();
        assert_eq!(received.correlation_id, 7);
        assert_eq!(received.client_id.as_deref(), Some("tether-test"));
        assert_eq!(received.request.group_id.to_string(), "orders");
        assert_eq!(received.request.rebalance_timeout_ms, 300_000);
    }

    #[test]
    fn test_other_api_rejected_by_coordinator_side() {
        let header = RequestHeader::default()
            .with_request_api_key(18)
            .with_request_api_version(3)
            .with_correlation_id(1);
        let mut payload = BytesMut::new();
        header.encode(&mut payload, REQUEST_HEADER_VERSION).unwrap();

        let err = decode_heartbeat_request(payload.freeze()).unwrap_err();
        assert!(matches!(err, TransportError::Decode { .. }), "{err}");
    }

    #[test]
    fn test_response_correlation_checked() {
        let response = ConsumerGroupHeartbeatResponse::default().with_member_epoch(3);
        let mut frame = encode_heartbeat_response(11, &response).unwrap();
        let payload = split_frame(&mut frame, MAX_RESPONSE_BYTES_DEFAULT)
            .unwrap()
            .unwrap();

        let err = decode_heartbeat_response(payload.clone(), 12).unwrap_err();
        assert!(matches!(
            err,
            TransportError::CorrelationMismatch {
                expected: 12,
                actual: 11
            }
        ));

        let decoded = decode_heartbeat_response(payload, 11).unwrap();
        assert_eq!(decoded.member_epoch, 3);
    }
}

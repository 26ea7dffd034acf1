//! Heartbeat error handling, end to end through `GroupConsumer`.
//!
//! Every code of every error group is injected on the first heartbeat (the
//! join) and on the second heartbeat (after an assignment was received). Runs
//! on tokio's paused clock so heartbeat cadence is exact.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tether_client::{ClientConfig, ClientError, GroupConsumer, RebalanceListener};
use tether_core::{ErrorCode, PartitionSet, TopicPartition};
use tether_membership::{HeartbeatRequest, MembershipConfig, MembershipStatus, RebalanceEvent, RebalanceKind};
use tokio::time::Instant;

use crate::mock_coordinator::MockCoordinator;
use crate::properties::InvariantChecker;
use crate::scenarios::{codes, variations};

const POLL_TIMEOUT: Duration = Duration::from_secs(5);

/// Listener feeding every delivered event into a shared checker.
#[derive(Clone, Default)]
struct CheckingListener(Arc<Mutex<InvariantChecker>>);

impl CheckingListener {
    fn checker(&self) -> std::sync::MutexGuard<'_, InvariantChecker> {
        self.0.lock().unwrap()
    }
}

impl RebalanceListener for CheckingListener {
    fn on_rebalance(&mut self, event: &RebalanceEvent) {
        self.checker().record_event(event);
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("tether=debug")
        .with_test_writer()
        .try_init();
}

fn config() -> ClientConfig {
    ClientConfig::new("test-group")
        .with_request_timeout_ms(1_000)
        .with_membership(
            MembershipConfig::new("test-group")
                .with_heartbeat_interval_ms(500)
                .with_retry(100, 3)
                .with_close_timeout_ms(2_000),
        )
}

fn start(coordinator: &MockCoordinator) -> (GroupConsumer<CheckingListener>, CheckingListener) {
    init_tracing();
    let listener = CheckingListener::default();
    let consumer = GroupConsumer::new(config(), coordinator.clone(), listener.clone()).unwrap();
    (consumer, listener)
}

/// Scripts `code` for the heartbeat selected by `variation`.
fn inject(coordinator: &MockCoordinator, code: ErrorCode, variation: u32) {
    if variation == variations::SECOND_HEARTBEAT {
        coordinator.skip_requests(1);
    }
    coordinator.push_request_errors(&[code]);
}

fn sent(coordinator: &MockCoordinator) -> Vec<HeartbeatRequest> {
    coordinator
        .requests()
        .into_iter()
        .map(|r| r.request)
        .collect()
}

async fn expect_event(
    consumer: &mut GroupConsumer<CheckingListener>,
    kind: RebalanceKind,
) -> RebalanceEvent {
    let event = consumer
        .poll(POLL_TIMEOUT)
        .await
        .unwrap()
        .unwrap_or_else(|| panic!("expected {kind} event"));
    assert_eq!(event.kind(), kind, "got {event}");
    event
}

// ============================================================================
// Fatal
// ============================================================================

async fn run_fatal(code: ErrorCode, variation: u32) {
    let coordinator = MockCoordinator::new(2);
    inject(&coordinator, code, variation);
    let (mut consumer, listener) = start(&coordinator);
    consumer.subscribe(["orders"]).await.unwrap();

    if variation == variations::SECOND_HEARTBEAT {
        expect_event(&mut consumer, RebalanceKind::Assign).await;
    }

    let err = consumer.poll(POLL_TIMEOUT).await.unwrap_err();
    assert!(
        matches!(err, ClientError::Fatal(ref fatal) if fatal.code == code),
        "{code}: {err}"
    );
    listener.checker().record_fatal(coordinator.request_count());

    // Surfaced exactly once.
    assert!(consumer.poll(Duration::from_millis(100)).await.unwrap().is_none());
    assert!(matches!(
        consumer.subscribe(["orders"]).await,
        Err(ClientError::InvalidState(_))
    ));

    // No heartbeat goes out, however long we wait.
    let sent_at_fatal = coordinator.request_count();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(coordinator.request_count(), sent_at_fatal, "{code}");

    let close = consumer.close().await.unwrap_err();
    assert!(matches!(close, ClientError::Fatal(ref fatal) if fatal.code == code));
    assert_eq!(consumer.close().await.unwrap_err(), close);
    assert!(matches!(
        consumer.poll(POLL_TIMEOUT).await,
        Err(ClientError::Closed)
    ));

    let mut checker = listener.checker();
    checker.check_requests(&sent(&coordinator));
    checker.assert_ok();
    assert_eq!(coordinator.leave_count(), 0);
    if variation == variations::FIRST_HEARTBEAT {
        assert!(checker.events().is_empty(), "{code}");
        assert_eq!(coordinator.request_count(), 1);
    } else {
        assert_eq!(
            checker.event_kinds(),
            vec![RebalanceKind::Assign, RebalanceKind::Lost],
            "{code}"
        );
        assert_eq!(coordinator.request_count(), 2);
    }
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_fatal_errors() {
    for &variation in variations::ALL {
        for &code in codes::FATAL {
            run_fatal(code, variation).await;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_unknown_code_is_fatal() {
    run_fatal(ErrorCode::from_code(9_999), variations::FIRST_HEARTBEAT).await;
    run_fatal(ErrorCode::from_code(9_999), variations::SECOND_HEARTBEAT).await;
}

// ============================================================================
// Retriable
// ============================================================================

async fn run_retriable(code: ErrorCode, variation: u32) {
    let coordinator = MockCoordinator::new(2);
    inject(&coordinator, code, variation);
    let (mut consumer, listener) = start(&coordinator);
    consumer.subscribe(["orders"]).await.unwrap();

    expect_event(&mut consumer, RebalanceKind::Assign).await;
    assert!(coordinator.wait_for_requests(3, POLL_TIMEOUT).await, "{code}");

    let diagnostics = consumer.take_diagnostics();
    assert_eq!(diagnostics.len(), 1, "{code}");
    assert!(diagnostics[0].code == code || code.is_local(), "{code}");

    // Nothing further for the application.
    assert!(consumer.poll(Duration::from_millis(100)).await.unwrap().is_none());

    consumer.close().await.unwrap();
    assert!(consumer.close().await.is_ok());

    let requests = sent(&coordinator);
    let mut checker = listener.checker();
    checker.check_requests(&requests);
    checker.assert_ok();
    assert_eq!(
        checker.event_kinds(),
        vec![RebalanceKind::Assign, RebalanceKind::Revoke],
        "{code}"
    );
    assert_eq!(coordinator.leave_count(), 1, "{code}");
    assert!(requests.last().is_some_and(HeartbeatRequest::is_leave));
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_retriable_errors() {
    for &variation in variations::ALL {
        for &code in codes::RETRIABLE {
            run_retriable(code, variation).await;
        }
    }
}

// ============================================================================
// Fenced
// ============================================================================

async fn run_fenced(code: ErrorCode, variation: u32) {
    let coordinator = MockCoordinator::new(2);
    inject(&coordinator, code, variation);
    let (mut consumer, listener) = start(&coordinator);
    consumer.subscribe(["orders"]).await.unwrap();

    let assigned = expect_event(&mut consumer, RebalanceKind::Assign).await;
    if variation == variations::SECOND_HEARTBEAT {
        let lost = expect_event(&mut consumer, RebalanceKind::Lost).await;
        assert_eq!(lost.partitions(), assigned.partitions());
        expect_event(&mut consumer, RebalanceKind::Assign).await;
    }

    let snapshot = consumer.snapshot().await.unwrap();
    assert!(!snapshot.member_id.is_empty());
    assert_eq!(snapshot.status, MembershipStatus::Stable);
    assert_eq!(snapshot.assignment.len(), 2);

    consumer.close().await.unwrap();

    let requests = sent(&coordinator);
    // The heartbeat after the fenced one rejoins.
    let fenced_at = coordinator
        .requests()
        .iter()
        .position(|r| r.injected == Some(code))
        .unwrap();
    assert!(requests[fenced_at + 1].is_join(), "{code}");

    let mut checker = listener.checker();
    checker.check_requests(&requests);
    checker.assert_ok();
    let expected = if variation == variations::FIRST_HEARTBEAT {
        vec![RebalanceKind::Assign, RebalanceKind::Revoke]
    } else {
        vec![
            RebalanceKind::Assign,
            RebalanceKind::Lost,
            RebalanceKind::Assign,
            RebalanceKind::Revoke,
        ]
    };
    assert_eq!(checker.event_kinds(), expected, "{code}");
    assert_eq!(coordinator.leave_count(), 1, "{code}");
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_fenced_errors() {
    for &variation in variations::ALL {
        for &code in codes::FENCED {
            run_fenced(code, variation).await;
        }
    }
}

// ============================================================================
// Cadence and close
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_heartbeat_retry_then_interval_cadence() {
    let coordinator = MockCoordinator::new(1);
    coordinator.push_request_errors(&[ErrorCode::CoordinatorNotAvailable; 5]);
    let (mut consumer, _listener) = start(&coordinator);
    consumer.subscribe(["orders"]).await.unwrap();

    expect_event(&mut consumer, RebalanceKind::Assign).await;

    let requests = coordinator.requests();
    let gaps: Vec<Duration> = requests
        .windows(2)
        .take(5)
        .map(|w| w[1].at - w[0].at)
        .collect();
    let ms = Duration::from_millis;
    assert_eq!(gaps, vec![ms(100), ms(100), ms(100), ms(500), ms(500)]);
    assert_eq!(consumer.take_diagnostics().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_interval_from_coordinator() {
    let coordinator = MockCoordinator::new(1);
    let (mut consumer, _listener) = start(&coordinator);
    consumer.subscribe(["orders"]).await.unwrap();
    expect_event(&mut consumer, RebalanceKind::Assign).await;

    tokio::time::sleep(Duration::from_millis(2_200)).await;
    let requests = coordinator.requests();
    assert!(requests.len() >= 5);
    let n = requests.len();
    assert_eq!(requests[n - 1].at - requests[n - 2].at, Duration::from_millis(500));
    assert_eq!(requests[n - 2].at - requests[n - 3].at, Duration::from_millis(500));
    // Only the join carries the subscription.
    assert!(requests[n - 1].request.subscribed_topics.is_none());
    consumer.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_close_retries_leave_until_acknowledged() {
    let coordinator = MockCoordinator::new(1);
    let (mut consumer, listener) = start(&coordinator);
    consumer.subscribe(["orders"]).await.unwrap();
    expect_event(&mut consumer, RebalanceKind::Assign).await;
    assert!(coordinator.wait_for_requests(2, POLL_TIMEOUT).await);

    coordinator.push_request_errors(&[ErrorCode::NotCoordinator]);
    consumer.close().await.unwrap();

    assert_eq!(coordinator.leave_count(), 2);
    assert_eq!(
        listener.checker().event_kinds(),
        vec![RebalanceKind::Assign, RebalanceKind::Revoke]
    );
}

#[tokio::test(start_paused = true)]
async fn test_close_gives_up_at_close_timeout() {
    let coordinator = MockCoordinator::new(1);
    let (mut consumer, _listener) = start(&coordinator);
    consumer.subscribe(["orders"]).await.unwrap();
    expect_event(&mut consumer, RebalanceKind::Assign).await;
    assert!(coordinator.wait_for_requests(2, POLL_TIMEOUT).await);

    coordinator.push_request_errors(&[ErrorCode::CoordinatorLoadInProgress; 100]);
    let started = Instant::now();
    consumer.close().await.unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(2_000), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(2_500), "{elapsed:?}");
    assert!(coordinator.leave_count() > 1);

    let snapshot = consumer.snapshot().await.unwrap();
    assert_eq!(snapshot.status, MembershipStatus::Unjoined);
    assert!(snapshot.assignment.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_close_before_subscribe_sends_nothing() {
    let coordinator = MockCoordinator::new(1);
    let (mut consumer, listener) = start(&coordinator);

    consumer.close().await.unwrap();
    assert_eq!(coordinator.request_count(), 0);
    assert!(listener.checker().events().is_empty());
    assert!(matches!(
        consumer.subscribe(["orders"]).await,
        Err(ClientError::Closed)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_subscribe_rejects_empty_topic_list() {
    let coordinator = MockCoordinator::new(1);
    let (mut consumer, _listener) = start(&coordinator);

    let err = consumer.subscribe(Vec::<String>::new()).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)), "{err}");
    assert_eq!(coordinator.request_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_resubscribe_sends_new_subscription() {
    let coordinator = MockCoordinator::new(1);
    let (mut consumer, listener) = start(&coordinator);
    consumer.subscribe(["orders"]).await.unwrap();
    expect_event(&mut consumer, RebalanceKind::Assign).await;

    consumer.subscribe(["orders", "payments"]).await.unwrap();
    let event = expect_event(&mut consumer, RebalanceKind::Assign).await;
    assert_eq!(format!("{}", event.partitions()), "payments[0]");

    let requests = sent(&coordinator);
    assert!(requests.iter().any(|r| {
        !r.is_join()
            && r.subscribed_topics.as_deref()
                == Some(&["orders".to_string(), "payments".to_string()][..])
    }));

    consumer.close().await.unwrap();
    let checker = listener.checker();
    checker.assert_ok();
    assert_eq!(checker.events().last().map(RebalanceEvent::kind), Some(RebalanceKind::Revoke));
    assert_eq!(checker.events().last().map(|e| e.partitions().len()), Some(2));
}

// ============================================================================
// Acknowledgement
// ============================================================================

fn owned(partitions: &[(&str, i32)]) -> PartitionSet {
    partitions
        .iter()
        .map(|(topic, p)| TopicPartition::new(*topic, *p))
        .collect()
}

/// Owned sets of every request the coordinator had seen, captured each time
/// the listener runs.
type Reported = Arc<Mutex<Vec<Vec<Option<PartitionSet>>>>>;

async fn expect_reported_after_listener(
    consumer: &mut GroupConsumer<impl RebalanceListener>,
    coordinator: &MockCoordinator,
    reported: &Reported,
    kind: RebalanceKind,
    owned_after: &PartitionSet,
) {
    let event = consumer.poll(POLL_TIMEOUT).await.unwrap().unwrap();
    assert_eq!(event.kind(), kind, "got {event}");

    let seen = reported.lock().unwrap().pop().unwrap();
    assert!(
        !seen.contains(&Some(owned_after.clone())),
        "coordinator told {owned_after} before the listener returned"
    );

    // The very next heartbeat confirms the new owned set.
    assert!(
        coordinator
            .wait_for_requests(seen.len() + 1, Duration::from_secs(1))
            .await
    );
    assert_eq!(
        coordinator.requests()[seen.len()].request.owned_partitions.as_ref(),
        Some(owned_after)
    );
}

#[tokio::test(start_paused = true)]
async fn test_rebalance_reported_only_after_listener_returns() {
    init_tracing();
    let coordinator = MockCoordinator::new(1);
    let reported = Reported::default();
    let listener = {
        let coordinator = coordinator.clone();
        let reported = Arc::clone(&reported);
        move |_: &RebalanceEvent| {
            let owned = coordinator
                .requests()
                .into_iter()
                .map(|r| r.request.owned_partitions)
                .collect();
            reported.lock().unwrap().push(owned);
        }
    };
    let mut consumer = GroupConsumer::new(config(), coordinator.clone(), listener).unwrap();

    consumer.subscribe(["orders", "payments"]).await.unwrap();
    let both = owned(&[("orders", 0), ("payments", 0)]);
    expect_reported_after_listener(
        &mut consumer,
        &coordinator,
        &reported,
        RebalanceKind::Assign,
        &both,
    )
    .await;
    assert_eq!(consumer.snapshot().await.unwrap().assignment, both);

    consumer.subscribe(["orders"]).await.unwrap();
    let orders = owned(&[("orders", 0)]);
    expect_reported_after_listener(
        &mut consumer,
        &coordinator,
        &reported,
        RebalanceKind::Revoke,
        &orders,
    )
    .await;
    assert_eq!(consumer.snapshot().await.unwrap().assignment, orders);

    consumer.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_poll_offers_event_again() {
    let coordinator = MockCoordinator::new(2);
    let (mut consumer, listener) = start(&coordinator);
    consumer.subscribe(["orders"]).await.unwrap();
    assert!(coordinator.wait_for_requests(1, POLL_TIMEOUT).await);
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Dropped while waiting for the driver's answer.
    let abandoned = tokio::time::timeout(Duration::ZERO, consumer.poll(POLL_TIMEOUT)).await;
    assert!(abandoned.is_err());

    let snapshot = consumer.snapshot().await.unwrap();
    assert!(snapshot.assignment.is_empty());
    assert_eq!(snapshot.events_delivered, 0);
    assert!(listener.checker().events().is_empty());
    assert!(sent(&coordinator)
        .iter()
        .all(|r| r.owned_partitions.as_ref().map_or(true, PartitionSet::is_empty)));

    let event = expect_event(&mut consumer, RebalanceKind::Assign).await;
    assert_eq!(event.partitions(), &owned(&[("orders", 0), ("orders", 1)]));
    let snapshot = consumer.snapshot().await.unwrap();
    assert_eq!(&snapshot.assignment, event.partitions());
    assert_eq!(snapshot.events_delivered, 1);

    consumer.close().await.unwrap();
    let checker = listener.checker();
    checker.assert_ok();
    assert_eq!(checker.event_kinds(), vec![RebalanceKind::Assign, RebalanceKind::Revoke]);
}

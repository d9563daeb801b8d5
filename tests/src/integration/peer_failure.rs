//! # Peer Failure and Stale Traffic
//!
//! Nothing here may stall the coordinator or corrupt another exchange:
//! dead peers cost answers, late messages are dropped, and every request is
//! closed by either its last response or its deadline.

use super::fixtures::*;
use cs_02_topology::TopologyMode;
use cs_04_coordinator::Coordinator;
use cs_05_peer_client::AskError;
use shared_bus::{ChannelSink, MessageSink};
use shared_types::{CorrelationId, MessageKind, Payload, PeerMessage, ProtocolError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[test]
fn test_dead_recipient_leaves_request_to_deadline() {
    let mut coordinator = Coordinator::new(TopologyMode::Broadcast, TTL);
    let (sink_a, mut rx_a) = ChannelSink::pair();
    let (sink_b, rx_b) = ChannelSink::pair();
    let (sink_c, mut rx_c) = ChannelSink::pair();
    let a = coordinator.register_peer(Arc::new(sink_a));
    let b = coordinator.register_peer(Arc::new(sink_b));
    let c = coordinator.register_peer(Arc::new(sink_c));
    let opened_at = Instant::now();

    let id = CorrelationId::new();
    coordinator
        .handle_message(a, PeerMessage::request(id, Payload::default()))
        .unwrap();
    assert_eq!(rx_c.try_recv().unwrap().id, id);

    // B was selected, then died without answering.
    drop(rx_b);
    assert!(coordinator.peer_exited(b));
    coordinator
        .handle_message(c, PeerMessage::response(id, label("c")))
        .unwrap();

    assert!(coordinator.is_pending(&id));
    assert!(rx_a.try_recv().is_err());

    assert_eq!(coordinator.sweep(opened_at + TTL - Duration::from_millis(1)), 0);
    assert_eq!(coordinator.sweep(opened_at + TTL + Duration::from_secs(1)), 1);
    assert!(!coordinator.is_pending(&id));
    assert!(rx_a.try_recv().is_err());

    let stats = coordinator.pending_stats();
    assert_eq!((stats.completed, stats.expired), (0, 1));
}

#[test]
fn test_next_request_skips_the_dead_peer() {
    let mut coordinator = Coordinator::new(TopologyMode::Broadcast, TTL);
    let (sink_a, mut rx_a) = ChannelSink::pair();
    let (sink_b, _rx_b) = ChannelSink::pair();
    let (sink_c, mut rx_c) = ChannelSink::pair();
    let a = coordinator.register_peer(Arc::new(sink_a));
    let b = coordinator.register_peer(Arc::new(sink_b));
    let c = coordinator.register_peer(Arc::new(sink_c));
    coordinator.peer_exited(b);

    let id = CorrelationId::new();
    coordinator
        .handle_message(a, PeerMessage::request(id, Payload::default()))
        .unwrap();
    assert_eq!(rx_c.try_recv().unwrap().id, id);
    coordinator
        .handle_message(c, PeerMessage::response(id, label("c")))
        .unwrap();

    let aggregate = rx_a.try_recv().unwrap();
    assert_eq!(labels(&aggregate.payload.into_sequence().unwrap()), ["c"]);
}

#[test]
fn test_duplicate_response_does_not_touch_later_request() {
    let mut coordinator = Coordinator::new(TopologyMode::Ring, TTL);
    let (sink_a, mut rx_a) = ChannelSink::pair();
    let (sink_b, _rx_b) = ChannelSink::pair();
    let a = coordinator.register_peer(Arc::new(sink_a));
    let b = coordinator.register_peer(Arc::new(sink_b));

    let first = CorrelationId::new();
    coordinator
        .handle_message(a, PeerMessage::request(first, Payload::default()))
        .unwrap();
    coordinator
        .handle_message(b, PeerMessage::response(first, label("first")))
        .unwrap();
    assert_eq!(rx_a.try_recv().unwrap().correlates_to, Some(first));

    let second = CorrelationId::new();
    coordinator
        .handle_message(a, PeerMessage::request(second, Payload::default()))
        .unwrap();

    let duplicate = coordinator.handle_message(b, PeerMessage::response(first, label("again")));
    assert_eq!(
        duplicate,
        Err(ProtocolError::StaleCorrelation {
            correlation_id: first
        })
    );
    assert!(coordinator.is_pending(&second));
    assert!(rx_a.try_recv().is_err());

    coordinator
        .handle_message(b, PeerMessage::response(second, label("second")))
        .unwrap();
    let aggregate = rx_a.try_recv().unwrap();
    assert_eq!(aggregate.correlates_to, Some(second));
    assert_eq!(labels(&aggregate.payload.into_sequence().unwrap()), ["second"]);

    let stats = coordinator.pending_stats();
    assert_eq!((stats.completed, stats.stale), (2, 1));
}

#[test]
fn test_unknown_response_leaves_open_request_alone() {
    let mut coordinator = Coordinator::new(TopologyMode::Broadcast, TTL);
    let (sink_a, mut rx_a) = ChannelSink::pair();
    let (sink_b, _rx_b) = ChannelSink::pair();
    let (sink_c, _rx_c) = ChannelSink::pair();
    let a = coordinator.register_peer(Arc::new(sink_a));
    let b = coordinator.register_peer(Arc::new(sink_b));
    let c = coordinator.register_peer(Arc::new(sink_c));

    let id = CorrelationId::new();
    coordinator
        .handle_message(a, PeerMessage::request(id, Payload::default()))
        .unwrap();
    coordinator
        .handle_message(b, PeerMessage::response(id, label("b")))
        .unwrap();

    let stray = CorrelationId::new();
    assert!(coordinator
        .handle_message(c, PeerMessage::response(stray, label("stray")))
        .is_err());
    assert!(coordinator.is_pending(&id));

    coordinator
        .handle_message(c, PeerMessage::response(id, label("c")))
        .unwrap();
    let aggregate = rx_a.try_recv().unwrap();
    assert_eq!(labels(&aggregate.payload.into_sequence().unwrap()), ["b", "c"]);
}

#[test]
fn test_dead_origin_aggregate_is_dropped() {
    let mut coordinator = Coordinator::new(TopologyMode::Broadcast, TTL);
    let (sink_a, rx_a) = ChannelSink::pair();
    let (sink_b, _rx_b) = ChannelSink::pair();
    let a = coordinator.register_peer(Arc::new(sink_a));
    let b = coordinator.register_peer(Arc::new(sink_b));

    let id = CorrelationId::new();
    coordinator
        .handle_message(a, PeerMessage::request(id, Payload::default()))
        .unwrap();
    drop(rx_a);
    coordinator.peer_exited(a);

    coordinator
        .handle_message(b, PeerMessage::response(id, label("b")))
        .unwrap();
    assert!(!coordinator.is_pending(&id));
    assert_eq!(coordinator.pending_stats().completed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_ask_expires_when_recipient_never_answers() {
    let (coordinator, peers) = start(TopologyMode::Broadcast, 3);
    let mut peers = peers.into_iter();
    let a = peers.next().unwrap().into_client(Arc::new(Labelled("a")));
    let mut b = peers.next().unwrap();
    let _c = peers.next().unwrap().into_client(Arc::new(Labelled("c")));

    let asking = {
        let client = Arc::clone(&a.client);
        tokio::spawn(async move { client.ask(Payload::default()).await })
    };

    // B receives the forward, then its process dies.
    let forwarded = b.inbox.recv().await.unwrap();
    assert_eq!(forwarded.kind, MessageKind::Request);
    drop(b.inbox);
    coordinator.handle.peer_exited(b.id);

    let result = asking.await.unwrap();
    assert!(matches!(result, Err(AskError::Expired { .. })));
    assert_eq!(a.client.outstanding(), 0);

    tokio::time::sleep(SWEEP * 2).await;
    let coordinator = coordinator.stop().await;
    let stats = coordinator.pending_stats();
    assert_eq!((stats.opened, stats.completed, stats.expired), (1, 0, 1));
    assert!(!coordinator.registry().is_live(b.id));
}

#[tokio::test(start_paused = true)]
async fn test_late_aggregate_after_local_expiry_is_ignored() {
    let (coordinator, peers) = start(TopologyMode::Ring, 2);
    let mut peers = peers.into_iter();
    let a = peers.next().unwrap().into_client(Arc::new(Labelled("a")));
    let mut b = peers.next().unwrap();

    let asking = {
        let client = Arc::clone(&a.client);
        tokio::spawn(async move { client.ask(Payload::default()).await })
    };
    let forwarded = b.inbox.recv().await.unwrap();
    assert!(matches!(
        asking.await.unwrap(),
        Err(AskError::Expired { .. })
    ));

    // B finally answers, after the coordinator's copy has expired as well.
    tokio::time::sleep(SWEEP * 2).await;
    b.outbox
        .deliver(PeerMessage::response(forwarded.id, label("late")))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let stats = coordinator.stop().await.pending_stats();
    assert_eq!(stats.completed, 0);
    assert_eq!(stats.stale, 1);
    assert_eq!(
        a.client
            .stats()
            .resolved
            .load(std::sync::atomic::Ordering::Relaxed),
        0
    );
}

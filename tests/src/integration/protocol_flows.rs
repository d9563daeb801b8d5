//! # Fan-Out / Fan-In Flows
//!
//! ```text
//! A ──request──▶ Coordinator ──request──▶ recipients (topology)
//! A ◀─aggregate── Coordinator ◀─response── recipients
//! ```

use super::fixtures::*;
use cs_02_topology::TopologyMode;
use cs_05_peer_client::AskError;
use cs_06_agent::{choose_best_action, QNetwork, SharedModelOracle};
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared_bus::MessageSink;
use shared_types::{
    CorrelationId, MessageKind, Payload, PeerMessage, PredictionVector, StateGrid,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_broadcast_aggregate_in_arrival_order() {
    let (coordinator, peers) = start(TopologyMode::Broadcast, 3);
    let mut peers = peers.into_iter();
    let a = peers.next().unwrap();
    let mut b = peers.next().unwrap();
    let mut c = peers.next().unwrap();
    let mut a_inbox = a.inbox;

    let id = CorrelationId::new();
    a.outbox
        .deliver(PeerMessage::request(id, label("state")))
        .unwrap();

    let at_b = b.inbox.recv().await.unwrap();
    let at_c = c.inbox.recv().await.unwrap();
    assert_eq!((at_b.kind, at_b.id), (MessageKind::Request, id));
    assert_eq!((at_c.kind, at_c.id), (MessageKind::Request, id));
    assert_eq!(at_b.payload, label("state"));

    c.outbox.deliver(PeerMessage::response(id, label("c"))).unwrap();
    b.outbox.deliver(PeerMessage::response(id, label("b"))).unwrap();

    let aggregate = a_inbox.recv().await.unwrap();
    assert_eq!(aggregate.kind, MessageKind::Aggregate);
    assert_eq!(aggregate.correlates_to, Some(id));
    assert_eq!(labels(&aggregate.payload.into_sequence().unwrap()), ["c", "b"]);

    let coordinator = coordinator.stop().await;
    let stats = coordinator.pending_stats();
    assert_eq!((stats.opened, stats.completed), (1, 1));
    assert_eq!(coordinator.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_ring_with_two_peers_forwards_once() {
    let (coordinator, peers) = start(TopologyMode::Ring, 2);
    let mut peers = peers.into_iter();
    let mut a = peers.next().unwrap();
    let mut b = peers.next().unwrap();

    let id = CorrelationId::new();
    a.outbox.deliver(PeerMessage::request(id, label("state"))).unwrap();
    assert_eq!(b.inbox.recv().await.unwrap().id, id);

    b.outbox.deliver(PeerMessage::response(id, label("b"))).unwrap();
    let aggregate = a.inbox.recv().await.unwrap();
    assert_eq!(labels(&aggregate.payload.into_sequence().unwrap()), ["b"]);

    // Nothing else reached B: one forward, not one per neighbour slot.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(b.inbox.try_recv().is_err());
    coordinator.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_ring_with_four_peers_asks_both_neighbours() {
    let (coordinator, peers) = start(TopologyMode::Ring, 4);
    let mut peers: Vec<_> = peers.into_iter().collect();

    let id = CorrelationId::new();
    peers[0]
        .outbox
        .deliver(PeerMessage::request(id, Payload::default()))
        .unwrap();

    // Worker 1's neighbours in a ring of four are 4 and 2.
    assert_eq!(peers[1].inbox.recv().await.unwrap().id, id);
    assert_eq!(peers[3].inbox.recv().await.unwrap().id, id);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(peers[2].inbox.try_recv().is_err());

    peers[3].outbox.deliver(PeerMessage::response(id, label("d"))).unwrap();
    peers[1].outbox.deliver(PeerMessage::response(id, label("b"))).unwrap();
    let aggregate = peers[0].inbox.recv().await.unwrap();
    assert_eq!(labels(&aggregate.payload.into_sequence().unwrap()), ["d", "b"]);
    coordinator.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_lone_peer_gets_empty_aggregate() {
    let (coordinator, peers) = start(TopologyMode::Broadcast, 1);
    let mut a = peers.into_iter().next().unwrap();

    let id = CorrelationId::new();
    a.outbox.deliver(PeerMessage::request(id, Payload::default())).unwrap();
    let aggregate = a.inbox.recv().await.unwrap();
    assert_eq!(aggregate.correlates_to, Some(id));
    assert!(aggregate.payload.into_sequence().unwrap().is_empty());
    coordinator.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_peer_clients_answer_each_other() {
    let (coordinator, peers) = start(TopologyMode::Broadcast, 3);
    let names = ["a", "b", "c"];
    let clients: Vec<ClientPeer> = peers
        .into_iter()
        .zip(names)
        .map(|(peer, name)| peer.into_client(Arc::new(Labelled(name))))
        .collect();

    let mut answers = labels(&clients[0].client.ask(label("state")).await.unwrap());
    answers.sort();
    assert_eq!(answers, ["b", "c"]);

    let mut answers = labels(&clients[2].client.ask(label("state")).await.unwrap());
    answers.sort();
    assert_eq!(answers, ["a", "b"]);

    for peer in &clients {
        assert_eq!(peer.client.outstanding(), 0);
    }
    coordinator.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_asks_are_correlated_independently() {
    let (coordinator, peers) = start(TopologyMode::Broadcast, 3);
    let clients: Vec<ClientPeer> = peers
        .into_iter()
        .zip(["a", "b", "c"])
        .map(|(peer, name)| peer.into_client(Arc::new(Labelled(name))))
        .collect();

    let (from_a, from_b, from_c) = tokio::join!(
        clients[0].client.ask(Payload::default()),
        clients[1].client.ask(Payload::default()),
        clients[2].client.ask(Payload::default()),
    );
    let mut from_a = labels(&from_a.unwrap());
    let mut from_b = labels(&from_b.unwrap());
    let mut from_c = labels(&from_c.unwrap());
    from_a.sort();
    from_b.sort();
    from_c.sort();
    assert_eq!(from_a, ["b", "c"]);
    assert_eq!(from_b, ["a", "c"]);
    assert_eq!(from_c, ["a", "b"]);

    let coordinator = coordinator.stop().await;
    assert_eq!(coordinator.pending_stats().completed, 3);
}

#[tokio::test(start_paused = true)]
async fn test_agent_models_answer_with_prediction_vectors() {
    let (coordinator, peers) = start(TopologyMode::Broadcast, 4);
    let mut rng = StdRng::seed_from_u64(21);
    let clients: Vec<ClientPeer> = peers
        .into_iter()
        .map(|peer| {
            let model = QNetwork::new(4, &[8], 4, 0.001, &mut rng);
            let oracle = SharedModelOracle::new(Arc::new(RwLock::new(model)));
            peer.into_client(Arc::new(oracle))
        })
        .collect();

    let state = StateGrid(vec![vec![3, 0], vec![1, 2]]);
    let answers = clients[0]
        .client
        .ask(Payload::encode(&state).unwrap())
        .await
        .unwrap();
    let peer_vectors: Vec<PredictionVector> =
        answers.iter().map(|p| p.decode().unwrap()).collect();
    assert_eq!(peer_vectors.len(), 3);
    assert!(peer_vectors.iter().all(|v| v.len() == 4));

    let local = PredictionVector::new(vec![f32::MIN; 4]);
    let best = peer_vectors
        .iter()
        .max_by(|x, y| x.max_value().unwrap().total_cmp(&y.max_value().unwrap()))
        .unwrap();
    assert_eq!(choose_best_action(&local, &peer_vectors), best.arg_max());
    coordinator.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_unrecognized_message_has_no_effect() {
    let (coordinator, peers) = start(TopologyMode::Broadcast, 2);
    let mut peers = peers.into_iter();
    let mut a = peers.next().unwrap();
    let mut b = peers.next().unwrap();

    let mut heartbeat = PeerMessage::request(CorrelationId::new(), Payload::default());
    heartbeat.kind = MessageKind::Other("heartbeat".into());
    a.outbox.deliver(heartbeat).unwrap();

    let id = CorrelationId::new();
    a.outbox.deliver(PeerMessage::request(id, Payload::default())).unwrap();
    assert_eq!(b.inbox.recv().await.unwrap().id, id);
    b.outbox.deliver(PeerMessage::response(id, label("b"))).unwrap();
    assert_eq!(a.inbox.recv().await.unwrap().correlates_to, Some(id));

    let coordinator = coordinator.stop().await;
    assert_eq!(coordinator.pending_stats().opened, 1);
}

#[tokio::test(start_paused = true)]
async fn test_ask_fails_fast_when_coordinator_is_gone() {
    let (coordinator, peers) = start(TopologyMode::Broadcast, 2);
    let a = peers.into_iter().next().unwrap().into_client(Arc::new(Labelled("a")));
    coordinator.stop().await;

    let result = a.client.ask(Payload::default()).await;
    assert!(matches!(result, Err(AskError::Transport(_))));
}

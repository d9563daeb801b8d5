//! # Line-Framed Transport
//!
//! The supervised session's wiring, with in-memory duplex streams standing
//! in for child-process pipes:
//!
//! ```text
//! coordinator ──spawn_writer──▶ down pipe ──pump_frames──▶ PeerClientService
//! coordinator ◀──pump_frames─── up pipe  ◀──spawn_writer── PeerClient
//! ```

use super::fixtures::{label, labels, Labelled, SWEEP, TTL};
use cs_02_topology::TopologyMode;
use cs_04_coordinator::{Coordinator, CoordinatorService};
use cs_05_peer_client::{PeerClient, PeerClientService};
use shared_bus::{pump_frames, spawn_writer, write_frame, ChannelSink, MessageSink};
use shared_types::{CorrelationId, Payload, PeerMessage, WorkerId};
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufReader, DuplexStream};
use tokio::sync::watch;

const PIPE: usize = 64 * 1024;

struct PipedWorker {
    client: Arc<PeerClient>,
    _stop: watch::Sender<bool>,
}

/// Worker side of one pipe pair.
fn spawn_worker(name: &'static str, down: DuplexStream, up: DuplexStream) -> PipedWorker {
    let (to_coordinator, _writer) = spawn_writer(up);
    let client = Arc::new(PeerClient::new(Arc::new(to_coordinator), TTL));

    let (inbound_sink, inbound) = ChannelSink::pair();
    tokio::spawn(async move {
        let mut reader = BufReader::new(down);
        let _ = pump_frames(&mut reader, |message| inbound_sink.deliver(message).is_ok()).await;
    });

    let (stop, stop_rx) = watch::channel(false);
    let service = PeerClientService::new(Arc::clone(&client), Arc::new(Labelled(name)), SWEEP);
    tokio::spawn(service.run(inbound, stop_rx));
    PipedWorker {
        client,
        _stop: stop,
    }
}

/// Coordinator plus one piped worker per name, with ids from 1.
fn start_piped(
    mode: TopologyMode,
    names: &[&'static str],
) -> (Vec<PipedWorker>, watch::Sender<bool>) {
    let mut coordinator = Coordinator::new(mode, TTL);
    let mut workers = Vec::new();
    let mut up_readers = Vec::new();

    for (n, name) in names.iter().enumerate() {
        let worker_id = WorkerId(n as u32 + 1);
        let (down_coordinator, down_worker) = tokio::io::duplex(PIPE);
        let (up_worker, up_coordinator) = tokio::io::duplex(PIPE);

        let (sink, _writer) = spawn_writer(down_coordinator);
        coordinator
            .register_peer_with_id(worker_id, Arc::new(sink))
            .unwrap();
        workers.push(spawn_worker(name, down_worker, up_worker));
        up_readers.push((worker_id, up_coordinator));
    }

    let (service, handle) = CoordinatorService::new(coordinator, SWEEP);
    let (shutdown, shutdown_rx) = watch::channel(false);
    tokio::spawn(service.run(shutdown_rx));

    for (worker_id, up) in up_readers {
        let handle = handle.clone();
        tokio::spawn(async move {
            let mut reader = BufReader::new(up);
            let _ = pump_frames(&mut reader, |message| handle.inbound(worker_id, message)).await;
            handle.peer_exited(worker_id);
        });
    }
    (workers, shutdown)
}

#[tokio::test]
async fn test_broadcast_over_pipes() {
    let (workers, _shutdown) = start_piped(TopologyMode::Broadcast, &["a", "b", "c"]);

    let mut answers = labels(&workers[1].client.ask(label("state")).await.unwrap());
    answers.sort();
    assert_eq!(answers, ["a", "c"]);
}

#[tokio::test]
async fn test_ring_over_pipes() {
    let (workers, _shutdown) = start_piped(TopologyMode::Ring, &["a", "b", "c", "d", "e"]);

    // Worker 1's ring neighbours are 5 and 2.
    let mut answers = labels(&workers[0].client.ask(Payload::default()).await.unwrap());
    answers.sort();
    assert_eq!(answers, ["b", "e"]);
}

#[tokio::test]
async fn test_garbage_on_the_pipe_is_skipped() {
    let mut coordinator = Coordinator::new(TopologyMode::Ring, TTL);
    let (down_coordinator, mut down_worker) = tokio::io::duplex(PIPE);
    let (mut up_worker, up_coordinator) = tokio::io::duplex(PIPE);
    let (sink, _writer) = spawn_writer(down_coordinator);
    coordinator.register_peer_with_id(WorkerId(1), Arc::new(sink)).unwrap();

    let (service, handle) = CoordinatorService::new(coordinator, SWEEP);
    let (_shutdown, shutdown_rx) = watch::channel(false);
    tokio::spawn(service.run(shutdown_rx));
    tokio::spawn(async move {
        let mut reader = BufReader::new(up_coordinator);
        let _ = pump_frames(&mut reader, |message| handle.inbound(WorkerId(1), message)).await;
    });

    up_worker.write_all(b"this is not an envelope\n").await.unwrap();
    let id = CorrelationId::new();
    write_frame(&mut up_worker, &PeerMessage::request(id, Payload::default()))
        .await
        .unwrap();

    // Alone in the ring: the request closes at once with an empty aggregate.
    let mut reader = BufReader::new(&mut down_worker);
    let mut aggregate = None;
    pump_frames(&mut reader, |message| {
        aggregate = Some(message);
        false
    })
    .await
    .unwrap();
    let aggregate = aggregate.unwrap();
    assert_eq!(aggregate.correlates_to, Some(id));
    assert!(aggregate.payload.into_sequence().unwrap().is_empty());
}

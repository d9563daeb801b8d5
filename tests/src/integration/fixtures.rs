//! Shared test fixtures.

use cs_02_topology::TopologyMode;
use cs_04_coordinator::{Coordinator, CoordinatorHandle, CoordinatorService, InboxSink};
use cs_05_peer_client::{LocalOracle, PeerClient, PeerClientService};
use shared_bus::ChannelSink;
use shared_types::{Payload, PeerMessage, ProtocolError, WorkerId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const TTL: Duration = Duration::from_secs(20);
pub const SWEEP: Duration = Duration::from_millis(500);

/// A running coordinator service.
pub struct TestCoordinator {
    pub handle: CoordinatorHandle,
    pub shutdown: watch::Sender<bool>,
    pub task: JoinHandle<Coordinator>,
}

impl TestCoordinator {
    /// Stop the service and take the coordinator back for inspection.
    pub async fn stop(self) -> Coordinator {
        let _ = self.shutdown.send(true);
        self.task.await.expect("coordinator task panicked")
    }
}

/// A peer driven by hand: the test reads what the coordinator sends it and
/// decides what to send back.
pub struct ScriptedPeer {
    pub id: WorkerId,
    pub inbox: UnboundedReceiver<PeerMessage>,
    pub outbox: InboxSink,
}

/// Start a coordinator with `n` hand-driven peers.
pub fn start(mode: TopologyMode, n: usize) -> (TestCoordinator, Vec<ScriptedPeer>) {
    let mut coordinator = Coordinator::new(mode, TTL);
    let registered: Vec<_> = (0..n)
        .map(|_| {
            let (sink, inbox) = ChannelSink::pair();
            (coordinator.register_peer(Arc::new(sink)), inbox)
        })
        .collect();

    let (service, handle) = CoordinatorService::new(coordinator, SWEEP);
    let (shutdown, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(service.run(shutdown_rx));

    let peers = registered
        .into_iter()
        .map(|(id, inbox)| ScriptedPeer {
            id,
            inbox,
            outbox: handle.sink_for(id),
        })
        .collect();
    (
        TestCoordinator {
            handle,
            shutdown,
            task,
        },
        peers,
    )
}

/// A peer running the real client stack.
pub struct ClientPeer {
    pub id: WorkerId,
    pub client: Arc<PeerClient>,
    pub stop: watch::Sender<bool>,
    pub task: JoinHandle<()>,
}

impl ScriptedPeer {
    /// Hand this peer over to a [`PeerClient`] answering with `oracle`.
    pub fn into_client(self, oracle: Arc<dyn LocalOracle>) -> ClientPeer {
        let client = Arc::new(PeerClient::new(Arc::new(self.outbox), TTL));
        let (stop, stop_rx) = watch::channel(false);
        let service = PeerClientService::new(Arc::clone(&client), oracle, SWEEP);
        let task = tokio::spawn(service.run(self.inbox, stop_rx));
        ClientPeer {
            id: self.id,
            client,
            stop,
            task,
        }
    }
}

/// Answers every request with a fixed label.
pub struct Labelled(pub &'static str);

impl LocalOracle for Labelled {
    fn answer(&self, _request: &Payload) -> Result<Payload, ProtocolError> {
        Ok(label(self.0))
    }
}

pub fn label(s: &str) -> Payload {
    Payload::from_value(serde_json::json!(s))
}

pub fn labels(payloads: &[Payload]) -> Vec<String> {
    payloads
        .iter()
        .map(|p| p.decode::<String>().expect("payload is not a label"))
        .collect()
}

//! Registry implementation.

use crate::errors::RegistryError;
use shared_bus::SharedSink;
use shared_types::WorkerId;
use std::fmt;
use tracing::{info, warn};

/// One attached worker. Dead peers keep their slot so ids are never reused.
struct PeerHandle {
    worker_id: WorkerId,
    alive: bool,
    sink: SharedSink,
}

impl fmt::Debug for PeerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerHandle")
            .field("worker_id", &self.worker_id)
            .field("alive", &self.alive)
            .finish_non_exhaustive()
    }
}

/// Insertion-ordered set of peers.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: Vec<PeerHandle>,
    next_id: u32,
}

impl PeerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a peer under the next free id.
    pub fn register(&mut self, sink: SharedSink) -> WorkerId {
        let worker_id = WorkerId(self.next_id.max(1));
        self.insert(worker_id, sink);
        worker_id
    }

    /// Attach a peer under an id chosen by the caller (process bootstrap
    /// tells each child its id before it connects).
    ///
    /// Fails if the id was ever registered, alive or not.
    pub fn register_with_id(
        &mut self,
        worker_id: WorkerId,
        sink: SharedSink,
    ) -> Result<(), RegistryError> {
        if worker_id.get() == 0 || self.get(worker_id).is_some() {
            return Err(RegistryError::DuplicatePeer(worker_id));
        }
        self.insert(worker_id, sink);
        Ok(())
    }

    fn insert(&mut self, worker_id: WorkerId, sink: SharedSink) {
        self.peers.push(PeerHandle {
            worker_id,
            alive: true,
            sink,
        });
        self.next_id = self.next_id.max(worker_id.get().saturating_add(1));
        info!(worker_id = %worker_id, live = self.live_count(), "Peer registered");
    }

    /// Mark a peer dead. Returns `true` if it was alive.
    pub fn unregister(&mut self, worker_id: WorkerId) -> bool {
        match self.peers.iter_mut().find(|p| p.worker_id == worker_id) {
            Some(peer) if peer.alive => {
                peer.alive = false;
                warn!(
                    worker_id = %worker_id,
                    live = self.live_count(),
                    "Peer exited, unregistered"
                );
                true
            }
            Some(_) => false,
            None => {
                warn!(worker_id = %worker_id, "Exit reported for unknown peer");
                false
            }
        }
    }

    fn get(&self, worker_id: WorkerId) -> Option<&PeerHandle> {
        self.peers.iter().find(|p| p.worker_id == worker_id)
    }

    #[must_use]
    pub fn is_live(&self, worker_id: WorkerId) -> bool {
        self.get(worker_id).is_some_and(|p| p.alive)
    }

    /// Sink of a live peer.
    #[must_use]
    pub fn sink(&self, worker_id: WorkerId) -> Option<SharedSink> {
        self.get(worker_id)
            .filter(|p| p.alive)
            .map(|p| p.sink.clone())
    }

    /// Live peers in registration order.
    #[must_use]
    pub fn live_ids(&self) -> Vec<WorkerId> {
        self.peers
            .iter()
            .filter(|p| p.alive)
            .map(|p| p.worker_id)
            .collect()
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.peers.iter().filter(|p| p.alive).count()
    }

    /// Left and right neighbour of `worker_id` on the ring of live peers.
    ///
    /// `None` if `worker_id` is not live. A lone peer is its own neighbour
    /// on both sides; with two live peers left and right coincide.
    #[must_use]
    pub fn neighbors(&self, worker_id: WorkerId) -> Option<(WorkerId, WorkerId)> {
        let live = self.live_ids();
        let index = live.iter().position(|&id| id == worker_id)?;
        let n = live.len();
        let left = live[(index + n - 1) % n];
        let right = live[(index + 1) % n];
        Some((left, right))
    }
}

//! # Coordinator Service
//!
//! The single dispatch task. Everything that mutates coordinator state goes
//! through its inbox, so a handler always runs to completion before the
//! next message is looked at.

use crate::coordinator::Coordinator;
use shared_bus::{MessageSink, TransportError};
use shared_types::{PeerMessage, WorkerId};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Default period of the deadline sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(500);

/// Input to the dispatch task.
#[derive(Debug, Clone)]
pub enum CoordinatorEvent {
    /// A decoded message from a worker.
    Inbound { from: WorkerId, message: PeerMessage },
    /// A worker's process (or task) has ended.
    PeerExited { worker_id: WorkerId },
}

/// Cloneable sender side of the inbox.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::UnboundedSender<CoordinatorEvent>,
}

impl CoordinatorHandle {
    /// Queue an inbound message. Returns `false` once the service has stopped.
    pub fn inbound(&self, from: WorkerId, message: PeerMessage) -> bool {
        self.sender
            .send(CoordinatorEvent::Inbound { from, message })
            .is_ok()
    }

    /// Queue a peer-exit notification.
    pub fn peer_exited(&self, worker_id: WorkerId) -> bool {
        self.sender
            .send(CoordinatorEvent::PeerExited { worker_id })
            .is_ok()
    }

    /// Sink for an in-process worker: everything it delivers arrives here
    /// as sent by `worker_id`.
    #[must_use]
    pub fn sink_for(&self, worker_id: WorkerId) -> InboxSink {
        InboxSink {
            worker_id,
            handle: self.clone(),
        }
    }
}

/// [`MessageSink`] that feeds the coordinator inbox on behalf of one worker.
#[derive(Debug, Clone)]
pub struct InboxSink {
    worker_id: WorkerId,
    handle: CoordinatorHandle,
}

impl MessageSink for InboxSink {
    fn deliver(&self, message: PeerMessage) -> Result<(), TransportError> {
        if self.handle.inbound(self.worker_id, message) {
            Ok(())
        } else {
            Err(TransportError::Closed)
        }
    }
}

/// Owns the [`Coordinator`] and drives it from one task.
pub struct CoordinatorService {
    coordinator: Coordinator,
    inbox: mpsc::UnboundedReceiver<CoordinatorEvent>,
    sweep_interval: Duration,
}

impl CoordinatorService {
    /// Wrap a coordinator whose peers are already registered.
    #[must_use]
    pub fn new(coordinator: Coordinator, sweep_interval: Duration) -> (Self, CoordinatorHandle) {
        let (sender, inbox) = mpsc::unbounded_channel();
        (
            Self {
                coordinator,
                inbox,
                sweep_interval,
            },
            CoordinatorHandle { sender },
        )
    }

    /// Dispatch until shutdown, until every handle is dropped, or until the
    /// last live peer exits. Returns the coordinator for inspection.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Coordinator {
        let mut sweep = tokio::time::interval(self.sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            topology = %self.coordinator.topology(),
            peers = self.coordinator.registry().live_count(),
            "Coordinator started"
        );

        loop {
            tokio::select! {
                event = self.inbox.recv() => {
                    let Some(event) = event else {
                        debug!("All coordinator handles dropped");
                        break;
                    };
                    if !self.dispatch(event) {
                        info!("All workers exited");
                        break;
                    }
                }
                _ = sweep.tick() => {
                    let removed = self.coordinator.sweep(Instant::now());
                    if removed > 0 {
                        debug!(removed, "Cleaned up expired pending requests");
                    }
                }
                _ = shutdown.changed() => {
                    info!("Coordinator shutdown signal received");
                    break;
                }
            }
        }

        let stats = self.coordinator.pending_stats();
        info!(
            opened = stats.opened,
            completed = stats.completed,
            expired = stats.expired,
            stale = stats.stale,
            still_pending = self.coordinator.pending_count(),
            "Coordinator stopped"
        );
        self.coordinator
    }

    /// Returns `false` when no live peer is left.
    fn dispatch(&mut self, event: CoordinatorEvent) -> bool {
        match event {
            CoordinatorEvent::Inbound { from, message } => {
                if let Err(e) = self.coordinator.handle_message(from, message) {
                    debug!(worker_id = %from, error = %e, "Message dropped");
                }
                true
            }
            CoordinatorEvent::PeerExited { worker_id } => {
                self.coordinator.peer_exited(worker_id);
                self.coordinator.registry().live_count() > 0
            }
        }
    }
}

//! # Peer Client Service
//!
//! Dispatch task for one worker: feeds inbound coordinator messages to the
//! [`PeerClient`] and runs the local deadline sweep. It runs beside the task
//! that calls `ask`, so a worker keeps answering peers while its own call is
//! suspended. When the inbound stream ends, every open call is failed so no
//! caller waits on an aggregate that can no longer arrive.

use crate::client::PeerClient;
use crate::ports::LocalOracle;
use shared_types::PeerMessage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Default period of the local deadline sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(500);

pub struct PeerClientService {
    client: Arc<PeerClient>,
    oracle: Arc<dyn LocalOracle>,
    sweep_interval: Duration,
}

impl PeerClientService {
    #[must_use]
    pub fn new(
        client: Arc<PeerClient>,
        oracle: Arc<dyn LocalOracle>,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            client,
            oracle,
            sweep_interval,
        }
    }

    /// Dispatch until the inbound stream ends or shutdown is signalled.
    pub async fn run(
        self,
        mut inbound: mpsc::UnboundedReceiver<PeerMessage>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut sweep = tokio::time::interval(self.sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                message = inbound.recv() => {
                    let Some(message) = message else {
                        let abandoned = self.client.abandon_all();
                        info!(abandoned, "Coordinator connection closed");
                        break;
                    };
                    if let Err(e) = self.client.handle_inbound(message, self.oracle.as_ref()) {
                        debug!(error = %e, "Inbound message dropped");
                    }
                }
                _ = sweep.tick() => {
                    let removed = self.client.expire_due(Instant::now());
                    if removed > 0 {
                        debug!(removed, "Cleaned up expired outbound calls");
                    }
                }
                _ = shutdown.changed() => {
                    debug!("Peer client shutdown signal received");
                    break;
                }
            }
        }
    }
}

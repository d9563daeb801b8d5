//! # Worker
//!
//! Everything one peer runs: the agent, its environment, the peer client
//! and the client's dispatch task.
//!
//! ```text
//!              ┌──────────── WorkerNode ────────────┐
//! inbound ───▶ │ PeerClientService ──▶ SharedModelOracle ──┐
//!              │        │                                   │ response
//!              │        ▼ aggregate                         ▼
//!              │   PeerClient ◀── ClientPredictions ◀── Trainer/agent
//!              └────────┬───────────────────────────────────┘
//!                       ▼ request / response
//!                  coordinator sink
//! ```

pub mod stdio;

pub use stdio::run_stdio_worker;

use crate::adapters::ClientPredictions;
use crate::container::RuntimeConfig;
use crate::training::{ResultsLog, Trainer, TrainingSummary};
use anyhow::{Context, Result};
use cs_05_peer_client::{PeerClient, PeerClientService};
use cs_06_agent::{DeepSarsaAgent, NoPeers, PeerPredictions, SharedModelOracle};
use cs_07_gridworld::Environment;
use shared_bus::SharedSink;
use shared_types::{PeerMessage, WorkerId};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// One peer, ready to train.
pub struct WorkerNode {
    worker_id: WorkerId,
    config: RuntimeConfig,
}

impl WorkerNode {
    /// `config.game.locs` must already be resolved.
    #[must_use]
    pub fn new(worker_id: WorkerId, config: RuntimeConfig) -> Self {
        Self { worker_id, config }
    }

    /// Train to completion.
    ///
    /// `to_coordinator` carries this worker's requests and responses;
    /// `inbound` yields what the coordinator sends back. Peer answers are
    /// served on a separate task for the whole session.
    pub async fn run(
        self,
        to_coordinator: SharedSink,
        inbound: mpsc::UnboundedReceiver<PeerMessage>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<TrainingSummary> {
        let worker_id = self.worker_id;
        let config = &self.config;
        let game = &config.game;
        let locs = game
            .locs
            .clone()
            .context("game layout must be resolved before workers start")?;

        let client = Arc::new(PeerClient::new(
            to_coordinator,
            config.protocol.request_ttl(),
        ));
        let peers: Arc<dyn PeerPredictions> = if config.workers > 1 {
            Arc::new(ClientPredictions::new(Arc::clone(&client)))
        } else {
            Arc::new(NoPeers)
        };

        let mut agent_config = config.agent.clone();
        agent_config.seed = agent_config
            .seed
            .map(|seed| seed.wrapping_add(u64::from(worker_id.get())));
        let mut agent = DeepSarsaAgent::new(game.width, game.height, agent_config, peers);
        let mut env = Environment::new(game.width, game.height, game.enemies, locs)
            .context("failed to build environment")?;

        let service = PeerClientService::new(
            Arc::clone(&client),
            Arc::new(SharedModelOracle::new(agent.model())),
            config.protocol.sweep_interval(),
        );
        let (service_stop, service_shutdown) = watch::channel(false);
        let service_task = tokio::spawn(service.run(inbound, service_shutdown));

        let mut results = ResultsLog::open(&config.results_path).with_context(|| {
            format!(
                "failed to open results file {}",
                config.results_path.display()
            )
        })?;

        info!(worker_id = %worker_id, episodes = config.agent.episodes, "Worker is running");
        let outcome = Trainer::new(worker_id, &mut agent, &mut env, Some(&mut results))
            .run(config.agent.episodes, shutdown)
            .await;

        let _ = service_stop.send(true);
        if service_task.await.is_err() {
            debug!(worker_id = %worker_id, "Peer client task ended abnormally");
        }
        let stats = client.stats();
        debug!(
            worker_id = %worker_id,
            asked = stats.asked.load(std::sync::atomic::Ordering::Relaxed),
            answered = stats.answered.load(std::sync::atomic::Ordering::Relaxed),
            expired = stats.expired.load(std::sync::atomic::Ordering::Relaxed),
            abandoned = stats.abandoned.load(std::sync::atomic::Ordering::Relaxed),
            "Peer client stopped"
        );

        Ok(outcome?)
    }
}

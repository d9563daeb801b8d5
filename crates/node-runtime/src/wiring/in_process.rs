//! Workers as tasks in this process.

use super::WorkerReport;
use crate::container::RuntimeConfig;
use crate::worker::WorkerNode;
use anyhow::{Context, Result};
use cs_04_coordinator::{Coordinator, CoordinatorService};
use shared_bus::{ChannelSink, SharedSink};
use shared_types::WorkerId;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Run a whole session with in-memory transports.
///
/// `config.game.locs` must already be resolved (see
/// [`prepare_session`](super::prepare_session)).
pub async fn run_in_process(
    config: RuntimeConfig,
    shutdown: watch::Receiver<bool>,
) -> Result<Vec<WorkerReport>> {
    let mut coordinator = Coordinator::new(config.topology, config.protocol.request_ttl());
    let inboxes: Vec<_> = (0..config.workers)
        .map(|_| {
            let (sink, inbound) = ChannelSink::pair();
            (coordinator.register_peer(Arc::new(sink)), inbound)
        })
        .collect();

    let (service, handle) = CoordinatorService::new(coordinator, config.protocol.sweep_interval());
    let coordinator_task = tokio::spawn(service.run(shutdown.clone()));
    info!(
        workers = config.workers,
        topology = %config.topology,
        "In-process session started"
    );

    let workers: Vec<_> = inboxes
        .into_iter()
        .map(|(worker_id, inbound)| {
            let node = WorkerNode::new(worker_id, config.clone());
            let to_coordinator: SharedSink = Arc::new(handle.sink_for(worker_id));
            let handle = handle.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                let outcome = node.run(to_coordinator, inbound, shutdown).await;
                handle.peer_exited(worker_id);
                (worker_id, outcome)
            })
        })
        .collect();
    drop(handle);

    let mut reports = Vec::with_capacity(workers.len());
    for task in workers {
        let (worker_id, outcome): (WorkerId, _) = task.await.context("worker task panicked")?;
        reports.push(match outcome {
            Ok(summary) => WorkerReport {
                worker_id,
                succeeded: !summary.interrupted,
                summary: Some(summary),
            },
            Err(e) => {
                warn!(worker_id = %worker_id, error = %e, "Worker died");
                WorkerReport {
                    worker_id,
                    summary: None,
                    succeeded: false,
                }
            }
        });
    }

    coordinator_task.await.context("coordinator task panicked")?;
    Ok(reports)
}

//! Worker process entry: the coordinator is on the other end of
//! stdin/stdout, one JSON envelope per line. Logs go to stderr.

use super::WorkerNode;
use crate::container::{RuntimeConfig, WORKER_ID_ENV};
use crate::training::TrainingSummary;
use anyhow::{Context, Result};
use shared_bus::{pump_frames, spawn_writer, ChannelSink, MessageSink};
use shared_types::WorkerId;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Worker id the coordinator assigned to this process.
pub fn worker_id_from_env() -> Result<WorkerId> {
    let raw = std::env::var(WORKER_ID_ENV).with_context(|| format!("{WORKER_ID_ENV} is not set"))?;
    let id = raw
        .trim()
        .parse()
        .with_context(|| format!("invalid {WORKER_ID_ENV} '{raw}'"))?;
    Ok(WorkerId(id))
}

/// Run a worker over this process's stdio.
pub async fn run_stdio_worker(
    worker_id: WorkerId,
    config: RuntimeConfig,
    shutdown: watch::Receiver<bool>,
) -> Result<TrainingSummary> {
    let (to_coordinator, writer_task) = spawn_writer(tokio::io::stdout());
    let (inbound_sink, inbound) = ChannelSink::pair();

    let reader_task = tokio::spawn(async move {
        let mut stdin = BufReader::new(tokio::io::stdin());
        let result = pump_frames(&mut stdin, |message| inbound_sink.deliver(message).is_ok()).await;
        match result {
            Ok(()) => debug!(worker_id = %worker_id, "Coordinator closed stdin"),
            Err(e) => warn!(worker_id = %worker_id, error = %e, "Reading from coordinator failed"),
        }
    });

    let summary = WorkerNode::new(worker_id, config)
        .run(Arc::new(to_coordinator), inbound, shutdown)
        .await;

    // The writer task ends once every sink clone is gone; the node dropped its
    // copy, so pending responses are flushed before the process exits.
    reader_task.abort();
    if writer_task.await.is_err() {
        debug!(worker_id = %worker_id, "Writer task ended abnormally");
    }
    summary
}

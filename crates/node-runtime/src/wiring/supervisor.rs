//! Workers as child processes.
//!
//! Each child is this executable run with the `worker` subcommand. Its stdin
//! carries coordinator → worker frames, its stdout worker → coordinator
//! frames; stderr is inherited so worker logs land beside ours.

use super::WorkerReport;
use crate::container::{RuntimeConfig, RUNTIME_CONFIG_ENV, WORKER_ID_ENV};
use anyhow::{Context, Result};
use cs_04_coordinator::{Coordinator, CoordinatorHandle, CoordinatorService};
use cs_telemetry::log_peer_event;
use shared_bus::{pump_frames, spawn_writer};
use shared_types::WorkerId;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Spawn `config.workers` children of `exe`, route their traffic and wait
/// for all of them to exit.
pub async fn run_supervised(
    exe: &Path,
    config: RuntimeConfig,
    shutdown: watch::Receiver<bool>,
) -> Result<Vec<WorkerReport>> {
    let config_json = config.to_worker_env()?;
    let mut coordinator = Coordinator::new(config.topology, config.protocol.request_ttl());

    let mut children = Vec::with_capacity(config.workers);
    for n in 1..=config.workers {
        let worker_id = WorkerId(u32::try_from(n).context("too many workers")?);
        let mut child = Command::new(exe)
            .arg("worker")
            .env(WORKER_ID_ENV, worker_id.get().to_string())
            .env(RUNTIME_CONFIG_ENV, &config_json)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {worker_id}"))?;

        let stdin = child.stdin.take().context("worker stdin not piped")?;
        let stdout = child.stdout.take().context("worker stdout not piped")?;
        let (sink, writer) = spawn_writer(stdin);
        coordinator.register_peer_with_id(worker_id, Arc::new(sink))?;
        info!(worker_id = %worker_id, pid = ?child.id(), "Worker is running");
        children.push((worker_id, child, stdout, writer));
    }

    let (service, handle) = CoordinatorService::new(coordinator, config.protocol.sweep_interval());
    let coordinator_task = tokio::spawn(service.run(shutdown));

    let watchers: Vec<_> = children
        .into_iter()
        .map(|(worker_id, child, stdout, writer)| {
            tokio::spawn(watch_child(worker_id, child, stdout, writer, handle.clone()))
        })
        .collect();
    drop(handle);

    let mut reports = Vec::with_capacity(watchers.len());
    for watcher in watchers {
        reports.push(watcher.await.context("worker watcher panicked")?);
    }
    coordinator_task.await.context("coordinator task panicked")?;
    Ok(reports)
}

/// Forward a child's frames to the coordinator until its stdout closes,
/// then reap it and report the exit.
async fn watch_child(
    worker_id: WorkerId,
    mut child: Child,
    stdout: ChildStdout,
    writer: JoinHandle<()>,
    handle: CoordinatorHandle,
) -> WorkerReport {
    let mut reader = BufReader::new(stdout);
    if let Err(e) = pump_frames(&mut reader, |message| handle.inbound(worker_id, message)).await {
        warn!(worker_id = %worker_id, error = %e, "Reading from worker failed");
    }

    let succeeded = match child.wait().await {
        Ok(status) if status.success() => {
            log_peer_event!(info, "supervisor", "Worker finished", worker_id);
            true
        }
        Ok(status) => {
            log_peer_event!(warn, "supervisor", "Worker died", worker_id, status = %status);
            false
        }
        Err(e) => {
            log_peer_event!(warn, "supervisor", "Worker died", worker_id, error = %e);
            false
        }
    };

    writer.abort();
    handle.peer_exited(worker_id);
    WorkerReport {
        worker_id,
        summary: None,
        succeeded,
    }
}

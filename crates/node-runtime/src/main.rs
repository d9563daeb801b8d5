//! # Collective-SARSA Node Runtime
//!
//! ```text
//! node-runtime [--config PATH] [--in-process] [coordinator]
//! node-runtime worker                       # spawned by the coordinator
//! node-runtime generate-game [--output PATH]
//! ```
//!
//! The coordinator resolves the game, starts `workers` agents and routes
//! their prediction requests until all of them have finished training.
//! Ctrl-C stops the session.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cs_telemetry::{init_logging, TelemetryConfig};
use node_runtime::worker::{run_stdio_worker, stdio::worker_id_from_env};
use node_runtime::{generate_game, prepare_session, run_in_process, run_supervised, RuntimeConfig};
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "node-runtime", version, about = "Collective deep SARSA training")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Run workers as tasks instead of child processes
    #[arg(long)]
    in_process: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a training session (default)
    Coordinator,
    /// Worker process entry; started by the coordinator
    #[command(hide = true)]
    Worker,
    /// Write a random game layout for the configured grid
    GenerateGame {
        #[arg(long, default_value = "game.json")]
        output: PathBuf,
    },
}

fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            let _ = tx.send(true);
        }
    });
    rx
}

async fn run_coordinator(cli: &Cli) -> Result<()> {
    init_logging(&TelemetryConfig::for_role("coordinator", None))?;
    let mut config = RuntimeConfig::load(cli.config.as_deref())?;
    info!(
        pid = std::process::id(),
        workers = config.workers,
        topology = %config.topology,
        "Coordinator is running"
    );

    prepare_session(&mut config)?;
    let shutdown = shutdown_on_ctrl_c();
    let reports = if cli.in_process {
        run_in_process(config, shutdown).await?
    } else {
        let exe = std::env::current_exe().context("cannot locate own executable")?;
        run_supervised(&exe, config, shutdown).await?
    };

    let failed = reports.iter().filter(|r| !r.succeeded).count();
    if failed > 0 {
        warn!(failed, total = reports.len(), "Session ended with failed workers");
    } else {
        info!(workers = reports.len(), "Session complete");
    }
    Ok(())
}

async fn run_worker() -> Result<()> {
    let worker_id = worker_id_from_env()?;
    init_logging(&TelemetryConfig::for_role("worker", Some(worker_id.get())))?;
    let config = RuntimeConfig::from_worker_env()?;

    let summary = run_stdio_worker(worker_id, config, shutdown_on_ctrl_c()).await?;
    if summary.interrupted {
        anyhow::bail!("{worker_id} interrupted");
    }
    Ok(())
}

fn run_generate_game(cli: &Cli, output: &Path) -> Result<()> {
    init_logging(&TelemetryConfig::for_role("generate-game", None))?;
    let config = RuntimeConfig::load(cli.config.as_deref())?;
    generate_game(&config, output)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let result = match &cli.command {
        None | Some(Command::Coordinator) => run_coordinator(&cli).await,
        Some(Command::Worker) => run_worker().await,
        Some(Command::GenerateGame { output }) => run_generate_game(&cli, output),
    };
    if let Err(e) = &result {
        error!(error = %e, "Exiting with error");
    }
    result
}

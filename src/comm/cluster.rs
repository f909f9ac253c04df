//! Coordinator-side process management for distributed runs.
//!
//! `mine --mode distributed` turns the current process into rank 0: it
//! binds a loopback listener, spawns the remaining ranks as child
//! processes of the same executable (hidden `worker` subcommand), and
//! then participates in the run like any other rank. Workers learn the
//! minimum support over the wire, so only the coordinator reads
//! configuration.

use super::{Communicator, TcpCommunicator};
use crate::mine::strategy::{CountingStrategy, Distributed};
use crate::mine::types::MiningOutcome;
use crate::mine::orchestrator;
use anyhow::{Context, Result, ensure};
use std::net::TcpListener;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Run a full distributed mine as rank 0 with `processes` ranks total.
/// Returns the outcome together with the strategy label for the timing
/// log. `processes == 0` selects hardware concurrency.
pub fn run_distributed(
    input: &Path,
    min_support: u64,
    processes: usize,
) -> Result<(MiningOutcome, String)> {
    let processes = if processes == 0 { num_cpus::get() } else { processes };

    let listener = TcpListener::bind(("127.0.0.1", 0))
        .context("cannot bind coordinator socket")?;
    let address = listener.local_addr().context("coordinator socket has no address")?;
    let executable = std::env::current_exe().context("cannot locate current executable")?;

    let mut children = Vec::with_capacity(processes.saturating_sub(1));
    let result = (|| {
        for rank in 1..processes {
            let child = Command::new(&executable)
                .arg("worker")
                .args(["--coordinator", &address.to_string()])
                .args(["--rank", &rank.to_string()])
                .args(["--workers", &processes.to_string()])
                .spawn()
                .with_context(|| format!("cannot spawn worker process for rank {rank}"))?;
            debug!(rank, pid = child.id(), "worker spawned");
            children.push(child);
        }

        coordinate(listener, processes, input, min_support)
    })();

    match result {
        Ok(outcome) => {
            for mut child in children {
                let status = child.wait().context("failed to wait for worker process")?;
                ensure!(status.success(), "worker process exited with {status}");
            }
            Ok(outcome)
        }
        Err(err) => {
            // A failed coordinator can leave workers blocked inside a
            // collective; reap them rather than hanging on wait.
            for mut child in children {
                child.kill().ok();
                child.wait().ok();
            }
            Err(err)
        }
    }
}

fn coordinate(
    listener: TcpListener,
    processes: usize,
    input: &Path,
    min_support: u64,
) -> Result<(MiningOutcome, String)> {
    let mut comm = TcpCommunicator::coordinator(listener, processes)?;
    comm.broadcast_u64(min_support)?;

    let mut strategy = Distributed::coordinate(comm, input)?;
    let label = strategy.label();
    let outcome = orchestrator::mine(&mut strategy, min_support)?;
    Ok((outcome, label))
}

/// Entry point for a spawned worker rank. Returns quietly when the
/// coordinator reports a load failure; the coordinator carries the
/// user-facing error.
pub fn run_worker(coordinator: &str, rank: usize, workers: usize) -> Result<()> {
    let mut comm = TcpCommunicator::connect(coordinator, rank, workers)?;
    let min_support = comm.broadcast_u64(0)?;

    match Distributed::join(comm)? {
        None => Ok(()),
        Some(mut strategy) => {
            // Every rank computes the identical result; only rank 0
            // reports it.
            orchestrator::mine(&mut strategy, min_support)?;
            Ok(())
        }
    }
}

//! Hidden entry point for a distributed worker rank.
//!
//! Spawned by `mine --mode distributed`; the minimum support and the
//! transaction partition both arrive over the wire, so this command
//! takes no mining parameters and prints nothing. Rank 0 reports the
//! shared result.

use crate::comm;
use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct WorkerArgs {
    /// Coordinator address (host:port)
    #[arg(long, value_name = "ADDR")]
    pub coordinator: String,

    /// This process's rank, 1..workers
    #[arg(long)]
    pub rank: usize,

    /// Total rank count, including the coordinator
    #[arg(long)]
    pub workers: usize,
}

pub fn execute(args: WorkerArgs) -> Result<()> {
    comm::run_worker(&args.coordinator, args.rank, args.workers)
}

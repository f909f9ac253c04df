//! The `sweep` command: re-run the full mine across worker counts and
//! log `(worker_count, elapsed_ms, itemset_count)` tuples.

use crate::cli::Output;
use crate::comm;
use crate::config::{ExecutionMode, MinerConfig};
use crate::dataset::TransactionStore;
use crate::mine::types::MiningOutcome;
use crate::mine::{self, orchestrator};
use crate::report::TimingLog;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct SweepArgs {
    /// Transaction file, one comma-separated transaction per line
    #[arg(value_name = "DATA")]
    pub input: PathBuf,

    /// Minimum support as an absolute transaction count
    #[arg(short = 's', long, value_name = "COUNT", allow_negative_numbers = true)]
    pub min_support: Option<i64>,

    /// Execution strategy to sweep (sequential runs once)
    #[arg(short, long, value_enum)]
    pub mode: Option<ExecutionMode>,

    /// Worker counts to test
    #[arg(long, value_delimiter = ',', default_value = "1,2,4,8,16")]
    pub workers_list: Vec<usize>,
}

pub fn execute(args: SweepArgs, config_path: Option<&str>, output: &Output) -> Result<()> {
    let config = MinerConfig::load(config_path)?;
    let min_support = config.resolve_min_support(args.min_support)?;
    let mode = args.mode.unwrap_or(ExecutionMode::Threaded);
    let log = TimingLog::new(&config.report.timing_log);

    output.header(&format!("Performance sweep ({mode})"));

    match mode {
        ExecutionMode::Sequential => {
            let (outcome, _) =
                super::mine::run(&args.input, mode, 1, min_support, output)?;
            record(&log, 1, &outcome, output)?;
        }
        ExecutionMode::Threaded => {
            let store = TransactionStore::load(&args.input)?;
            output.info(&format!("Loaded {} transactions", store.len()));

            let available = num_cpus::get();
            for &workers in &args.workers_list {
                if workers == 0 || workers > available {
                    output.warning(&format!(
                        "skipping {workers} workers (machine has {available} cores)"
                    ));
                    continue;
                }
                let mut strategy = mine::Threaded::new(store.clone(), workers);
                let outcome = orchestrator::mine(&mut strategy, min_support)?;
                record(&log, workers, &outcome, output)?;
            }
        }
        ExecutionMode::Distributed => {
            let available = num_cpus::get();
            for &workers in &args.workers_list {
                if workers == 0 || workers > available {
                    output.warning(&format!(
                        "skipping {workers} workers (machine has {available} cores)"
                    ));
                    continue;
                }
                let (outcome, _) = comm::run_distributed(&args.input, min_support, workers)?;
                record(&log, workers, &outcome, output)?;
            }
        }
    }

    output.blank_line();
    output.success(&format!(
        "Sweep complete; timings appended to {}",
        config.report.timing_log.display()
    ));
    Ok(())
}

fn record(
    log: &TimingLog,
    workers: usize,
    outcome: &MiningOutcome,
    output: &Output,
) -> Result<()> {
    output.step(&format!(
        "{} workers: {} ms, {} itemsets",
        workers,
        outcome.elapsed_ms,
        outcome.itemsets.len()
    ));
    log.append_sweep(workers, outcome.elapsed_ms, outcome.itemsets.len())
}

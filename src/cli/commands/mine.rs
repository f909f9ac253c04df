//! The `mine` command: one full run under a chosen execution strategy.

use crate::cli::Output;
use crate::comm;
use crate::config::{ExecutionMode, MinerConfig};
use crate::dataset::TransactionStore;
use crate::mine::strategy::CountingStrategy;
use crate::mine::types::MiningOutcome;
use crate::mine::{self, orchestrator};
use crate::report::{self, TimingLog};
use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct MineArgs {
    /// Transaction file, one comma-separated transaction per line
    #[arg(value_name = "DATA")]
    pub input: PathBuf,

    /// Minimum support as an absolute transaction count
    #[arg(short = 's', long, value_name = "COUNT", allow_negative_numbers = true)]
    pub min_support: Option<i64>,

    /// Execution strategy
    #[arg(short, long, value_enum)]
    pub mode: Option<ExecutionMode>,

    /// Worker threads or processes (0 = hardware concurrency)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Show statistics after mining
    #[arg(long)]
    pub stats: bool,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON format
    Json,
}

pub fn execute(args: MineArgs, config_path: Option<&str>, output: &Output) -> Result<()> {
    let config = MinerConfig::load(config_path)?;
    let min_support = config.resolve_min_support(args.min_support)?;
    let mode = args.mode.unwrap_or(config.mining.mode);
    let workers = args.workers.unwrap_or(config.mining.workers);

    let (outcome, label) = run(&args.input, mode, workers, min_support, output)?;

    match args.format {
        OutputFormat::Json => {
            let value = report::to_json(&outcome, &label);
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => print_text(&outcome, output),
    }

    if args.stats {
        print_stats(&outcome, &label, output);
    }

    TimingLog::new(&config.report.timing_log).append_run(&label, outcome.elapsed_ms)?;
    output.verbose(&format!("timing appended to {}", config.report.timing_log.display()));

    Ok(())
}

/// Run one mine under `mode`, returning the outcome and the strategy
/// label for the timing log. Shared with the sweep command.
pub(crate) fn run(
    input: &Path,
    mode: ExecutionMode,
    workers: usize,
    min_support: u64,
    output: &Output,
) -> Result<(MiningOutcome, String)> {
    match mode {
        ExecutionMode::Sequential => {
            let store = TransactionStore::load(input)?;
            output.info(&format!("Loaded {} transactions", store.len()));

            let mut strategy = mine::Sequential::new(store);
            let label = strategy.label();
            let outcome = orchestrator::mine(&mut strategy, min_support)?;
            Ok((outcome, label))
        }
        ExecutionMode::Threaded => {
            let store = TransactionStore::load(input)?;
            output.info(&format!("Loaded {} transactions", store.len()));

            let mut strategy = mine::Threaded::new(store, workers);
            output.info(&format!("Counting with {} threads", strategy.workers()));
            let label = strategy.label();
            let outcome = orchestrator::mine(&mut strategy, min_support)?;
            Ok((outcome, label))
        }
        ExecutionMode::Distributed => {
            let (outcome, label) = comm::run_distributed(input, min_support, workers)?;
            output.info(&format!(
                "Loaded {} transactions across {}",
                outcome.transactions, label
            ));
            Ok((outcome, label))
        }
    }
}

fn print_text(outcome: &MiningOutcome, output: &Output) {
    output.header("Frequent itemsets");

    for (size, group) in report::group_by_size(outcome) {
        println!();
        println!("{size}-itemsets:");
        println!("-------------");
        for (itemset, support) in group {
            println!("{}", report::format_itemset(itemset, support));
        }
    }

    output.blank_line();
    output.success(&format!(
        "Found {} frequent itemsets across {} levels in {} ms",
        outcome.itemsets.len(),
        outcome.levels,
        outcome.elapsed_ms
    ));
}

fn print_stats(outcome: &MiningOutcome, label: &str, output: &Output) {
    output.section_header("Mining statistics");
    output.key_value("Strategy:", label);
    output.summary_stats("Transactions:", outcome.transactions);
    output.summary_stats("Levels:", outcome.levels);
    output.summary_stats("Itemsets:", outcome.itemsets.len());
    output.summary_stats("Elapsed ms:", outcome.elapsed_ms as usize);
}

//! # Levelmine - Level-wise Frequent Itemset Mining
//!
//! A frequent itemset miner built on the classic level-wise (Apriori)
//! algorithm, with three interchangeable execution strategies that are
//! guaranteed to produce identical results:
//!
//! - **Sequential**: a single thread over the full database
//! - **Threaded**: a fixed shared-memory pool with lock-free private
//!   accumulators, summed after the fork-join barrier
//! - **Distributed**: multiple processes over disjoint partitions,
//!   aggregated through blocking collective operations
//!
//! ## Quick Start
//!
//! ```bash
//! # Mine with an absolute support threshold of 2
//! levelmine mine transactions.csv --min-support 2
//!
//! # Same result, eight threads
//! levelmine mine transactions.csv --min-support 2 --mode threaded --workers 8
//!
//! # Same result, four processes
//! levelmine mine transactions.csv --min-support 2 --mode distributed --workers 4
//! ```

pub mod cli;
pub mod comm;
pub mod config;
pub mod dataset;
pub mod mine;
pub mod parallel;
pub mod report;

pub use cli::{Cli, Output};
pub use config::MinerConfig;

/// Result type alias for levelmine operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

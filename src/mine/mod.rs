//! The level-wise mining core: candidate generation, support counting,
//! and the driver that runs them under an injectable execution strategy.

pub mod candidates;
pub mod orchestrator;
pub mod strategy;
pub mod support;
pub mod types;

pub use orchestrator::mine;
pub use strategy::{CountingStrategy, Distributed, Sequential, Threaded};
pub use types::{Itemset, MiningOutcome, SupportMap};

//! Core mining data types.

use crate::dataset::Item;
use std::collections::BTreeMap;

/// Ascending, duplicate-free item sequence treated as a set; its length
/// is its level.
pub type Itemset = Vec<Item>;

/// Itemsets keyed in canonical (lexicographic) order with their
/// aggregated support: one frequent level, or the accumulated union of
/// all levels. Canonical ordering makes printed output deterministic.
pub type SupportMap = BTreeMap<Itemset, u64>;

/// Outcome of a full mining run.
#[derive(Debug, Clone)]
pub struct MiningOutcome {
    /// Every frequent itemset found, across all levels.
    pub itemsets: SupportMap,
    /// Deepest level with at least one frequent itemset.
    pub levels: usize,
    /// Total transactions in the database (all partitions).
    pub transactions: usize,
    pub elapsed_ms: u64,
}

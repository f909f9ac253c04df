//! Subset testing and per-partition support counting.
//!
//! This is the dominant cost of a run: O(candidates × transactions × k).
//! Both execution strategies that parallelize do so by splitting the
//! transaction range and summing the per-range counts this module
//! produces.

use crate::dataset::{Item, Transaction};
use crate::mine::types::Itemset;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Sorted-merge subset test. Both sequences must be ascending and
/// duplicate-free; the walk is linear in the transaction length.
pub fn is_subset(itemset: &[Item], transaction: &[Item]) -> bool {
    let mut haystack = transaction.iter();

    'candidates: for needle in itemset {
        for item in haystack.by_ref() {
            match item.cmp(needle) {
                Ordering::Less => continue,
                Ordering::Equal => continue 'candidates,
                Ordering::Greater => return false,
            }
        }
        return false;
    }
    true
}

/// Support of every candidate over `transactions`, indexed like
/// `candidates`.
pub fn count_supports(candidates: &[Itemset], transactions: &[Transaction]) -> Vec<u64> {
    let mut counts = vec![0u64; candidates.len()];
    for transaction in transactions {
        for (slot, candidate) in counts.iter_mut().zip(candidates) {
            if is_subset(candidate, transaction) {
                *slot += 1;
            }
        }
    }
    counts
}

/// Raw per-item occurrence counts, the level-1 candidate source.
pub fn item_occurrences(transactions: &[Transaction]) -> BTreeMap<Item, u64> {
    let mut counts = BTreeMap::new();
    for transaction in transactions {
        for item in transaction {
            *counts.entry(item.clone()).or_insert(0) += 1;
        }
    }
    counts
}

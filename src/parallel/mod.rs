//! Fixed-size fork-join pool for the counting phase.
//!
//! Worker threads scan disjoint transaction index ranges and accumulate
//! into private count vectors; the vectors are summed only after every
//! thread has joined, so the scan itself takes no locks. The pool is
//! forked once per level, for counting only.

use crate::dataset::{Item, Transaction, partition};
use crate::mine::support;
use crate::mine::types::Itemset;
use anyhow::{Result, bail};
use std::collections::BTreeMap;

/// Fork-join counting pool with a fixed worker count.
#[derive(Debug, Clone)]
pub struct CountingPool {
    workers: usize,
}

impl CountingPool {
    /// `workers == 0` selects hardware concurrency.
    pub fn new(workers: usize) -> Self {
        let workers = if workers == 0 { num_cpus::get() } else { workers };
        Self { workers }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Never fork more workers than there are transactions.
    fn plan(&self, work: usize) -> usize {
        self.workers.min(work.max(1))
    }

    /// Count candidate supports across the pool and sum the per-thread
    /// vectors after the join.
    pub fn count_supports(
        &self,
        candidates: &[Itemset],
        transactions: &[Transaction],
    ) -> Result<Vec<u64>> {
        let workers = self.plan(transactions.len());
        let ranges = partition::block_ranges(transactions.len(), workers);

        let scan = crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = ranges
                .into_iter()
                .map(|range| {
                    let block = &transactions[range];
                    scope.spawn(move |_| support::count_supports(candidates, block))
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Result<Vec<_>, _>>()
        });

        let partials = match scan {
            Ok(Ok(partials)) => partials,
            _ => bail!("worker thread panicked during support counting"),
        };

        let mut totals = vec![0u64; candidates.len()];
        for partial in partials {
            for (total, count) in totals.iter_mut().zip(partial) {
                *total += count;
            }
        }
        Ok(totals)
    }

    /// Per-item occurrence counts via private per-thread maps, merged
    /// after the join.
    pub fn item_occurrences(&self, transactions: &[Transaction]) -> Result<BTreeMap<Item, u64>> {
        let workers = self.plan(transactions.len());
        let ranges = partition::block_ranges(transactions.len(), workers);

        let scan = crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = ranges
                .into_iter()
                .map(|range| {
                    let block = &transactions[range];
                    scope.spawn(move |_| support::item_occurrences(block))
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Result<Vec<_>, _>>()
        });

        let partials = match scan {
            Ok(Ok(partials)) => partials,
            _ => bail!("worker thread panicked during item counting"),
        };

        let mut totals = BTreeMap::new();
        for partial in partials {
            for (item, count) in partial {
                *totals.entry(item).or_insert(0) += count;
            }
        }
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> Vec<Transaction> {
        vec![t(&["a", "b"]), t(&["a", "b", "c"]), t(&["a"]), t(&["b", "c"])]
    }

    #[test]
    fn test_pool_matches_sequential_counts() {
        let transactions = sample();
        let candidates = vec![t(&["a", "b"]), t(&["a", "c"]), t(&["b", "c"])];
        let sequential = support::count_supports(&candidates, &transactions);

        for workers in [1, 2, 3, 8] {
            let pool = CountingPool::new(workers);
            assert_eq!(pool.count_supports(&candidates, &transactions).unwrap(), sequential);
        }
    }

    #[test]
    fn test_pool_matches_sequential_item_counts() {
        let transactions = sample();
        let sequential = support::item_occurrences(&transactions);

        for workers in [1, 2, 3, 8] {
            let pool = CountingPool::new(workers);
            assert_eq!(pool.item_occurrences(&transactions).unwrap(), sequential);
        }
    }

    #[test]
    fn test_zero_selects_hardware_concurrency() {
        assert!(CountingPool::new(0).workers() >= 1);
        assert_eq!(CountingPool::new(3).workers(), 3);
    }

    #[test]
    fn test_empty_store() {
        let pool = CountingPool::new(4);
        let candidates = vec![t(&["a", "b"])];
        assert_eq!(pool.count_supports(&candidates, &[]).unwrap(), vec![0]);
        assert!(pool.item_occurrences(&[]).unwrap().is_empty());
    }
}

//! Level-wise driver: breadth-first generate / count / filter until no
//! candidate survives.
//!
//! The accumulated result is threaded from one level to the next and
//! finalized only on termination; nothing outside this function mutates
//! it. On the distributed backend every rank runs this same loop over
//! its own partition and the collectives keep the levels in lock-step.

use crate::mine::candidates;
use crate::mine::strategy::CountingStrategy;
use crate::mine::types::{MiningOutcome, SupportMap};
use anyhow::{Result, ensure};
use std::time::Instant;
use tracing::debug;

/// Run the full level-wise mine under the given strategy.
///
/// `min_support` is an absolute transaction count; retention is
/// inclusive (`support >= min_support`).
pub fn mine<S: CountingStrategy + ?Sized>(
    strategy: &mut S,
    min_support: u64,
) -> Result<MiningOutcome> {
    ensure!(min_support >= 1, "minimum support must be positive");

    // All ranks reach this point before the clock starts.
    strategy.synchronize()?;
    let started = Instant::now();

    let occurrences = strategy.item_counts()?;
    let mut frequent: SupportMap = occurrences
        .into_iter()
        .filter(|(_, count)| *count >= min_support)
        .map(|(item, count)| (vec![item], count))
        .collect();
    debug!(level = 1, frequent = frequent.len(), "level complete");

    let mut accumulated = frequent.clone();
    let mut levels = usize::from(!frequent.is_empty());

    while !frequent.is_empty() {
        let candidates = candidates::generate_candidates(&frequent);
        if candidates.is_empty() {
            break;
        }
        debug!(level = levels + 1, candidates = candidates.len(), "counting candidates");

        let supports = strategy.candidate_supports(&candidates)?;
        frequent = candidates
            .into_iter()
            .zip(supports)
            .filter(|(_, support)| *support >= min_support)
            .collect();
        if frequent.is_empty() {
            break;
        }

        levels += 1;
        debug!(level = levels, frequent = frequent.len(), "level complete");
        accumulated.extend(frequent.iter().map(|(itemset, support)| (itemset.clone(), *support)));
    }

    // All ranks agree the run is over before the clock stops.
    strategy.synchronize()?;

    Ok(MiningOutcome {
        itemsets: accumulated,
        levels,
        transactions: strategy.total_transactions(),
        elapsed_ms: started.elapsed().as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::TransactionStore;
    use crate::mine::strategy::{Sequential, Threaded};

    fn t(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// The §8-style market-basket database used throughout the suite.
    fn sample_store() -> TransactionStore {
        TransactionStore::new(vec![
            t(&["a", "b"]),
            t(&["a", "b", "c"]),
            t(&["a"]),
            t(&["b", "c"]),
        ])
    }

    #[test]
    fn test_worked_example() {
        let mut strategy = Sequential::new(sample_store());
        let outcome = mine(&mut strategy, 2).unwrap();

        let expected: Vec<(Vec<String>, u64)> = vec![
            (t(&["a"]), 3),
            (t(&["a", "b"]), 2),
            (t(&["b"]), 3),
            (t(&["b", "c"]), 2),
            (t(&["c"]), 2),
        ];
        let found: Vec<(Vec<String>, u64)> =
            outcome.itemsets.iter().map(|(k, v)| (k.clone(), *v)).collect();

        assert_eq!(found, expected);
        assert_eq!(outcome.levels, 2);
        assert_eq!(outcome.transactions, 4);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        // {c} has support exactly 2: retained at s=2, excluded at s=3.
        let outcome = mine(&mut Sequential::new(sample_store()), 2).unwrap();
        assert_eq!(outcome.itemsets.get(&t(&["c"])), Some(&2));

        let outcome = mine(&mut Sequential::new(sample_store()), 3).unwrap();
        assert_eq!(outcome.itemsets.get(&t(&["c"])), None);
        assert_eq!(outcome.itemsets.get(&t(&["a"])), Some(&3));
    }

    #[test]
    fn test_anti_monotonicity() {
        let outcome = mine(&mut Sequential::new(sample_store()), 2).unwrap();

        // Every non-empty proper subset of a frequent itemset is frequent.
        for itemset in outcome.itemsets.keys() {
            for drop in 0..itemset.len() {
                if itemset.len() == 1 {
                    continue;
                }
                let mut subset = itemset.clone();
                subset.remove(drop);
                assert!(
                    outcome.itemsets.contains_key(&subset),
                    "{subset:?} missing although {itemset:?} is frequent"
                );
            }
        }
    }

    #[test]
    fn test_strategies_agree_on_full_outcome() {
        let sequential = mine(&mut Sequential::new(sample_store()), 2).unwrap();
        for workers in [1, 2, 4] {
            let threaded = mine(&mut Threaded::new(sample_store(), workers), 2).unwrap();
            assert_eq!(threaded.itemsets, sequential.itemsets);
            assert_eq!(threaded.levels, sequential.levels);
        }
    }

    #[test]
    fn test_rerun_is_identical() {
        let first = mine(&mut Sequential::new(sample_store()), 2).unwrap();
        let second = mine(&mut Sequential::new(sample_store()), 2).unwrap();
        assert_eq!(first.itemsets, second.itemsets);
    }

    #[test]
    fn test_threshold_above_everything_yields_empty_result() {
        let outcome = mine(&mut Sequential::new(sample_store()), 100).unwrap();
        assert!(outcome.itemsets.is_empty());
        assert_eq!(outcome.levels, 0);
    }

    #[test]
    fn test_empty_database() {
        let outcome = mine(&mut Sequential::new(TransactionStore::default()), 1).unwrap();
        assert!(outcome.itemsets.is_empty());
        assert_eq!(outcome.transactions, 0);
    }

    #[test]
    fn test_non_positive_support_is_rejected() {
        let err = mine(&mut Sequential::new(sample_store()), 0).unwrap_err();
        assert!(err.to_string().contains("must be positive"));
    }
}

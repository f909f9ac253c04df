//! Level-wise candidate generation.

use crate::mine::types::{Itemset, SupportMap};
use std::collections::BTreeSet;

/// Join frequent k-itemsets into (k+1)-candidates in canonical order.
///
/// Every ordered pair (A, B) with A before B is joinable when their first
/// k-1 items agree; the candidate is A plus B's last item, re-sorted.
/// The classical Apriori-Gen refinement of also requiring every k-subset
/// of the candidate to be frequent is intentionally not applied: the
/// join stays a pure pairwise pass and support filtering removes the
/// extra candidates, at the cost of counting a few more of them.
///
/// An empty input yields an empty output, which terminates the
/// level-wise loop.
pub fn generate_candidates(frequent: &SupportMap) -> Vec<Itemset> {
    let itemsets: Vec<&Itemset> = frequent.keys().collect();

    let mut joined = BTreeSet::new();
    for (i, a) in itemsets.iter().enumerate() {
        for b in &itemsets[i + 1..] {
            if !joinable(a, b) {
                continue;
            }
            let mut candidate: Itemset = (*a).clone();
            candidate.push(b[b.len() - 1].clone());
            candidate.sort();
            joined.insert(candidate);
        }
    }

    joined.into_iter().collect()
}

/// Two same-level itemsets join when all but their last items agree.
fn joinable(a: &[crate::dataset::Item], b: &[crate::dataset::Item]) -> bool {
    let prefix = a.len() - 1;
    a[..prefix] == b[..prefix]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(itemsets: &[&[&str]]) -> SupportMap {
        itemsets
            .iter()
            .map(|items| (items.iter().map(|s| s.to_string()).collect::<Vec<_>>(), 1))
            .collect()
    }

    fn set(items: &[&str]) -> Itemset {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_singletons_join_into_all_pairs() {
        let candidates = generate_candidates(&level(&[&["a"], &["b"], &["c"]]));
        assert_eq!(
            candidates,
            vec![set(&["a", "b"]), set(&["a", "c"]), set(&["b", "c"])]
        );
    }

    #[test]
    fn test_pairs_join_only_on_shared_prefix() {
        // {a,b} and {a,c} share the prefix [a]; {b,c} shares with neither.
        let candidates = generate_candidates(&level(&[&["a", "b"], &["a", "c"], &["b", "c"]]));
        assert_eq!(candidates, vec![set(&["a", "b", "c"])]);
    }

    #[test]
    fn test_candidates_are_canonical_and_duplicate_free() {
        let candidates =
            generate_candidates(&level(&[&["a", "b"], &["a", "c"], &["a", "d"], &["b", "c"]]));
        assert_eq!(
            candidates,
            vec![set(&["a", "b", "c"]), set(&["a", "b", "d"]), set(&["a", "c", "d"])]
        );
        for candidate in &candidates {
            let mut sorted = candidate.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(&sorted, candidate);
        }
    }

    #[test]
    fn test_empty_input_terminates() {
        assert!(generate_candidates(&SupportMap::new()).is_empty());
    }
}

//! Contiguous partitioning of the transaction list across workers.
//!
//! Worker `i` of `P` owns a block of `N/P` transactions plus one extra
//! when `i < N mod P`, starting at `i*(N/P) + min(i, N mod P)`. Blocks
//! are pairwise disjoint and together cover the whole list, so summing
//! per-block counts reproduces the global count exactly.

use std::ops::Range;

/// Index range of the block owned by `rank` out of `workers`.
///
/// `workers` must be at least 1.
pub fn block_range(total: usize, workers: usize, rank: usize) -> Range<usize> {
    debug_assert!(workers >= 1);
    debug_assert!(rank < workers);

    let base = total / workers;
    let remainder = total % workers;
    let start = rank * base + rank.min(remainder);
    let len = base + usize::from(rank < remainder);
    start..start + len
}

/// All worker blocks in rank order.
pub fn block_ranges(total: usize, workers: usize) -> Vec<Range<usize>> {
    (0..workers).map(|rank| block_range(total, workers, rank)).collect()
}

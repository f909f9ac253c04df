//! Interchangeable counting/aggregation strategies.
//!
//! One level-wise algorithm drives all three backends; a strategy only
//! decides where the transactions live and how partial counts become
//! global counts. Every strategy must return the same aggregated
//! numbers for the same database, which is what makes the backends
//! interchangeable.

use crate::comm::{self, Communicator};
use crate::dataset::{Item, TransactionStore, partition};
use crate::mine::support;
use crate::mine::types::Itemset;
use crate::parallel::CountingPool;
use anyhow::{Result, bail};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

/// Counting backend injected into the level-wise driver.
pub trait CountingStrategy {
    /// Label recorded in the timing log.
    fn label(&self) -> String;

    /// Globally aggregated per-item occurrence counts (level 1).
    fn item_counts(&mut self) -> Result<BTreeMap<Item, u64>>;

    /// Globally aggregated candidate supports, indexed like `candidates`.
    /// Every rank of a distributed run must pass an identical candidate
    /// list, which holds because candidates derive deterministically
    /// from the previous, already-agreed level.
    fn candidate_supports(&mut self, candidates: &[Itemset]) -> Result<Vec<u64>>;

    /// Run-boundary synchronization; a no-op off the distributed backend.
    fn synchronize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Total transactions in the database, across all partitions.
    fn total_transactions(&self) -> usize;
}

/// Single thread of control over the full database.
pub struct Sequential {
    store: TransactionStore,
}

impl Sequential {
    pub fn new(store: TransactionStore) -> Self {
        Self { store }
    }
}

impl CountingStrategy for Sequential {
    fn label(&self) -> String {
        "sequential".to_string()
    }

    fn item_counts(&mut self) -> Result<BTreeMap<Item, u64>> {
        Ok(support::item_occurrences(self.store.transactions()))
    }

    fn candidate_supports(&mut self, candidates: &[Itemset]) -> Result<Vec<u64>> {
        Ok(support::count_supports(candidates, self.store.transactions()))
    }

    fn total_transactions(&self) -> usize {
        self.store.len()
    }
}

/// Fixed thread pool over the full database; counting forks the pool,
/// the join is the only barrier, and private vectors are summed after.
pub struct Threaded {
    store: TransactionStore,
    pool: CountingPool,
}

impl Threaded {
    /// `workers == 0` selects hardware concurrency.
    pub fn new(store: TransactionStore, workers: usize) -> Self {
        Self { store, pool: CountingPool::new(workers) }
    }

    pub fn workers(&self) -> usize {
        self.pool.workers()
    }
}

impl CountingStrategy for Threaded {
    fn label(&self) -> String {
        format!("threaded_{}_threads", self.pool.workers())
    }

    fn item_counts(&mut self) -> Result<BTreeMap<Item, u64>> {
        self.pool.item_occurrences(self.store.transactions())
    }

    fn candidate_supports(&mut self, candidates: &[Itemset]) -> Result<Vec<u64>> {
        self.pool.count_supports(candidates, self.store.transactions())
    }

    fn total_transactions(&self) -> usize {
        self.store.len()
    }
}

/// One rank of a distributed run: owns a contiguous partition of the
/// database and aggregates through blocking collectives. Every level
/// boundary is a synchronization point.
#[derive(Debug)]
pub struct Distributed<C: Communicator> {
    comm: C,
    local: TransactionStore,
    total: usize,
}

impl<C: Communicator> Distributed<C> {
    /// Coordinator setup: load the database, broadcast the total
    /// transaction count, ship each worker its contiguous block, keep
    /// rank 0's block locally.
    ///
    /// A load failure is broadcast as a zero count so workers exit
    /// instead of blocking forever on data that will never arrive.
    pub fn coordinate(mut comm: C, input: &Path) -> Result<Self> {
        let store = match TransactionStore::load(input) {
            Ok(store) if !store.is_empty() => store,
            Ok(_) => {
                comm.broadcast_u64(0)?;
                bail!("no transactions loaded from {}", input.display());
            }
            Err(err) => {
                comm.broadcast_u64(0)?;
                return Err(err);
            }
        };

        let total = store.len();
        comm.broadcast_u64(total as u64)?;

        let world = comm.world_size();
        for rank in 1..world {
            let block = partition::block_range(total, world, rank);
            comm.send_u64(rank, block.len() as u64)?;
            for transaction in &store.transactions()[block] {
                comm.send_frame(rank, &comm::encode_items(transaction))?;
            }
        }

        let own = partition::block_range(total, world, 0);
        let local = TransactionStore::new(store.transactions()[own].to_vec());
        debug!(rank = comm.rank(), transactions = local.len(), "partition assigned");

        comm.barrier()?;
        Ok(Self { comm, local, total })
    }

    /// Worker setup: receive this rank's partition. Returns `None` when
    /// the coordinator broadcast a zero count, meaning it failed to load
    /// and every rank should stop.
    pub fn join(mut comm: C) -> Result<Option<Self>> {
        let total = comm.broadcast_u64(0)? as usize;
        if total == 0 {
            return Ok(None);
        }

        let count = comm.recv_u64()? as usize;
        let mut transactions = Vec::with_capacity(count);
        for _ in 0..count {
            let frame = comm.recv_frame()?;
            transactions.push(comm::decode_items(&frame)?);
        }
        let local = TransactionStore::new(transactions);
        debug!(rank = comm.rank(), transactions = local.len(), "partition received");

        comm.barrier()?;
        Ok(Some(Self { comm, local, total }))
    }
}

impl<C: Communicator> CountingStrategy for Distributed<C> {
    fn label(&self) -> String {
        format!("distributed_{}_processes", self.comm.world_size())
    }

    /// Level-1 aggregation: the item vocabulary is not known up front,
    /// so ranks first all-gather their locally-observed item lists,
    /// then run one integer-sum reduction per vocabulary item.
    fn item_counts(&mut self) -> Result<BTreeMap<Item, u64>> {
        let local = support::item_occurrences(self.local.transactions());

        let local_items: Vec<Item> = local.keys().cloned().collect();
        let gathered = self.comm.all_gather(&comm::encode_items(&local_items))?;

        let mut vocabulary = BTreeSet::new();
        for frame in gathered {
            vocabulary.extend(comm::decode_items(&frame)?);
        }

        let mut global = BTreeMap::new();
        for item in vocabulary {
            let count = local.get(&item).copied().unwrap_or(0);
            global.insert(item, self.comm.all_reduce_sum(count)?);
        }
        Ok(global)
    }

    /// Level k>1: every rank regenerated the identical candidate list,
    /// so a direct integer-sum reduction per candidate suffices.
    fn candidate_supports(&mut self, candidates: &[Itemset]) -> Result<Vec<u64>> {
        let local = support::count_supports(candidates, self.local.transactions());

        let mut global = Vec::with_capacity(local.len());
        for count in local {
            global.push(self.comm.all_reduce_sum(count)?);
        }
        Ok(global)
    }

    fn synchronize(&mut self) -> Result<()> {
        self.comm.barrier()
    }

    fn total_transactions(&self) -> usize {
        self.total
    }
}

//! Result rendering and the append-only timing log.

use crate::mine::types::{Itemset, MiningOutcome};
use anyhow::{Context, Result};
use serde_json::json;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Frequent itemsets grouped by size, each group in canonical order.
pub fn group_by_size(outcome: &MiningOutcome) -> BTreeMap<usize, Vec<(&Itemset, u64)>> {
    let mut grouped: BTreeMap<usize, Vec<(&Itemset, u64)>> = BTreeMap::new();
    for (itemset, support) in &outcome.itemsets {
        grouped.entry(itemset.len()).or_default().push((itemset, *support));
    }
    grouped
}

/// Display form of one itemset line: `{ a, b } : 2`.
pub fn format_itemset(itemset: &Itemset, support: u64) -> String {
    format!("{{ {} }} : {}", itemset.join(", "), support)
}

/// Structured form of a full outcome for `--format json`.
pub fn to_json(outcome: &MiningOutcome, strategy: &str) -> serde_json::Value {
    json!({
        "itemsets": outcome
            .itemsets
            .iter()
            .map(|(itemset, support)| {
                json!({
                    "items": itemset,
                    "size": itemset.len(),
                    "support": support,
                })
            })
            .collect::<Vec<_>>(),
        "statistics": {
            "strategy": strategy,
            "transactions": outcome.transactions,
            "levels": outcome.levels,
            "total_itemsets": outcome.itemsets.len(),
            "elapsed_ms": outcome.elapsed_ms,
        },
    })
}

/// Append-only log of run labels and elapsed times.
pub struct TimingLog {
    path: PathBuf,
}

impl TimingLog {
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_path_buf() }
    }

    fn open(&self) -> Result<std::fs::File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("cannot open timing log: {}", self.path.display()))
    }

    /// One run: a strategy label line, then an elapsed-milliseconds line.
    pub fn append_run(&self, label: &str, elapsed_ms: u64) -> Result<()> {
        let mut file = self.open()?;
        writeln!(file, "{label}")?;
        writeln!(file, "{elapsed_ms}")?;
        Ok(())
    }

    /// One sweep iteration: worker count, elapsed time, itemset count.
    pub fn append_sweep(&self, workers: usize, elapsed_ms: u64, itemsets: usize) -> Result<()> {
        let mut file = self.open()?;
        writeln!(file, "workers: {workers}, elapsed_ms: {elapsed_ms}, itemsets: {itemsets}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mine::types::SupportMap;

    fn outcome() -> MiningOutcome {
        let mut itemsets = SupportMap::new();
        itemsets.insert(vec!["a".into()], 3);
        itemsets.insert(vec!["b".into()], 3);
        itemsets.insert(vec!["a".into(), "b".into()], 2);
        MiningOutcome { itemsets, levels: 2, transactions: 4, elapsed_ms: 7 }
    }

    #[test]
    fn test_grouping_by_size() {
        let outcome = outcome();
        let grouped = group_by_size(&outcome);
        assert_eq!(grouped[&1].len(), 2);
        assert_eq!(grouped[&2].len(), 1);
    }

    #[test]
    fn test_itemset_line_format() {
        assert_eq!(format_itemset(&vec!["a".into(), "b".into()], 2), "{ a, b } : 2");
    }

    #[test]
    fn test_json_statistics() {
        let value = to_json(&outcome(), "sequential");
        assert_eq!(value["statistics"]["total_itemsets"], 3);
        assert_eq!(value["statistics"]["strategy"], "sequential");
        assert_eq!(value["itemsets"][0]["items"], json!(["a"]));
    }

    #[test]
    fn test_timing_log_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timings.log");
        let log = TimingLog::new(&path);

        log.append_run("sequential", 12).unwrap();
        log.append_run("threaded_4_threads", 5).unwrap();
        log.append_sweep(4, 5, 9).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "sequential\n12\nthreaded_4_threads\n5\nworkers: 4, elapsed_ms: 5, itemsets: 9\n"
        );
    }
}

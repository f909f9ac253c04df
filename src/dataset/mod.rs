//! Transaction database loading and storage.
//!
//! A transaction is an ascending, duplicate-free sequence of items; the
//! sorted-merge subset test in the mining core relies on that invariant,
//! so it is enforced here at the only point where raw input enters the
//! system.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

pub mod partition;

/// Atomic item identifier, ordered lexicographically.
pub type Item = String;

/// Ascending, duplicate-free sequence of items.
pub type Transaction = Vec<Item>;

/// Trailing sentinel some datasets append to every line; never a real item.
const TRAILING_SENTINEL: &str = "-1";

/// In-memory transaction database: the full input, or one worker's
/// partition of it.
#[derive(Debug, Clone, Default)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
}

impl TransactionStore {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    /// Load a transaction database from a plain-text file, one
    /// comma-separated transaction per line. Lines that hold no usable
    /// items are skipped; an unreadable file is a fatal load error.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("cannot open transaction file: {}", path.display()))?;

        let mut transactions = Vec::new();
        for (number, line) in BufReader::new(file).lines().enumerate() {
            let line = line
                .with_context(|| format!("cannot read transaction file: {}", path.display()))?;
            match parse_line(&line) {
                Some(transaction) => transactions.push(transaction),
                None => {
                    if !line.trim().is_empty() {
                        debug!(line = number + 1, "skipping line with no usable items");
                    }
                }
            }
        }

        Ok(Self { transactions })
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}

/// Parse one input line into a sorted, duplicate-free transaction.
///
/// Items are comma-separated with surrounding whitespace trimmed; empty
/// fields and the trailing `-1` sentinel are dropped. Returns `None` when
/// nothing usable remains.
pub fn parse_line(line: &str) -> Option<Transaction> {
    let mut items: Vec<Item> = line
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty() && *item != TRAILING_SENTINEL)
        .map(str::to_string)
        .collect();

    if items.is_empty() {
        return None;
    }

    items.sort();
    items.dedup();
    Some(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_line_sorts_and_trims() {
        assert_eq!(
            parse_line(" milk , bread,eggs"),
            Some(vec!["bread".into(), "eggs".into(), "milk".into()])
        );
    }

    #[test]
    fn test_parse_line_drops_sentinel_and_empties() {
        assert_eq!(parse_line("a,,b,-1"), Some(vec!["a".into(), "b".into()]));
        assert_eq!(parse_line("-1"), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line(""), None);
    }

    #[test]
    fn test_parse_line_deduplicates_repeated_items() {
        // A repeated item after trimming would break the ascending
        // duplicate-free invariant the subset test depends on.
        assert_eq!(parse_line("b,a,a"), Some(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn test_load_skips_blank_and_malformed_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a,b").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "-1").unwrap();
        writeln!(file, "c").unwrap();

        let store = TransactionStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.transactions()[0], vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.transactions()[1], vec!["c".to_string()]);
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let err = TransactionStore::load(Path::new("does-not-exist.csv")).unwrap_err();
        assert!(err.to_string().contains("cannot open transaction file"));
    }
}

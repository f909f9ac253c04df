//! Collective communication for the distributed backend.
//!
//! Every message on the wire is one of two shapes: an 8-byte big-endian
//! unsigned scalar, or a length-prefixed byte buffer (4-byte big-endian
//! length, then the payload) whose payload is a comma-joined item list.
//! Collectives block until every rank has participated; a rank that
//! never arrives blocks the whole run, with no timeout or health check.
//!
//! Rank 0 is the coordinator. Point-to-point transfer exists only for
//! the one-time distribution of transaction partitions from rank 0.

use anyhow::{Result, anyhow};
use std::io::{Read, Write};

mod cluster;
mod tcp;

pub use cluster::{run_distributed, run_worker};
pub use tcp::TcpCommunicator;

use crate::dataset::Item;

pub const COORDINATOR_RANK: usize = 0;

/// Collective and point-to-point operations shared by every rank of a
/// distributed run. All operations are blocking and must be invoked in
/// the same order on every rank.
pub trait Communicator {
    fn rank(&self) -> usize;
    fn world_size(&self) -> usize;

    /// Broadcast a scalar from the coordinator; every rank returns the
    /// coordinator's value. Non-coordinator callers pass a placeholder.
    fn broadcast_u64(&mut self, value: u64) -> Result<u64>;

    /// Integer-sum reduction of one scalar across all ranks; every rank
    /// returns the global sum.
    fn all_reduce_sum(&mut self, value: u64) -> Result<u64>;

    /// Gather one buffer from every rank; every rank returns all
    /// buffers in rank order.
    fn all_gather(&mut self, payload: &[u8]) -> Result<Vec<Vec<u8>>>;

    /// Block until every rank has arrived.
    fn barrier(&mut self) -> Result<()>;

    /// Coordinator-only: send a scalar to one rank.
    fn send_u64(&mut self, rank: usize, value: u64) -> Result<()>;

    /// Coordinator-only: send a framed buffer to one rank.
    fn send_frame(&mut self, rank: usize, payload: &[u8]) -> Result<()>;

    /// Worker-only: receive a scalar from the coordinator.
    fn recv_u64(&mut self) -> Result<u64>;

    /// Worker-only: receive a framed buffer from the coordinator.
    fn recv_frame(&mut self) -> Result<Vec<u8>>;

    fn is_coordinator(&self) -> bool {
        self.rank() == COORDINATOR_RANK
    }
}

/// Comma-join an item list into a wire payload. Items can never contain
/// commas: the comma is the field separator at parse time.
pub fn encode_items(items: &[Item]) -> Vec<u8> {
    items.join(",").into_bytes()
}

/// Decode a comma-joined item list.
pub fn decode_items(payload: &[u8]) -> Result<Vec<Item>> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| anyhow!("item payload is not valid UTF-8"))?;
    Ok(text
        .split(',')
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect())
}

pub(crate) fn write_u64(writer: &mut impl Write, value: u64) -> std::io::Result<()> {
    writer.write_all(&value.to_be_bytes())
}

pub(crate) fn read_u64(reader: &mut impl Read) -> std::io::Result<u64> {
    let mut buffer = [0u8; 8];
    reader.read_exact(&mut buffer)?;
    Ok(u64::from_be_bytes(buffer))
}

pub(crate) fn write_frame(writer: &mut impl Write, payload: &[u8]) -> std::io::Result<()> {
    let length = u32::try_from(payload.len()).map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "frame exceeds u32 length")
    })?;
    writer.write_all(&length.to_be_bytes())?;
    writer.write_all(payload)
}

pub(crate) fn read_frame(reader: &mut impl Read) -> std::io::Result<Vec<u8>> {
    let mut length = [0u8; 4];
    reader.read_exact(&mut length)?;
    let mut payload = vec![0u8; u32::from_be_bytes(length) as usize];
    reader.read_exact(&mut payload)?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_roundtrip() {
        let items = vec!["bread".to_string(), "eggs".to_string(), "milk".to_string()];
        assert_eq!(decode_items(&encode_items(&items)).unwrap(), items);
    }

    #[test]
    fn test_empty_payload_decodes_empty() {
        assert!(decode_items(b"").unwrap().is_empty());
    }

    #[test]
    fn test_frame_roundtrip() {
        let mut wire = Vec::new();
        write_frame(&mut wire, b"a,b,c").unwrap();
        write_u64(&mut wire, 42).unwrap();

        let mut cursor = std::io::Cursor::new(wire);
        assert_eq!(read_frame(&mut cursor).unwrap(), b"a,b,c");
        assert_eq!(read_u64(&mut cursor).unwrap(), 42);
    }
}

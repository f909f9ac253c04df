//! Blocking TCP transport for the collective operations.
//!
//! Star topology: every worker holds one stream to the coordinator, and
//! the coordinator holds one stream per worker. A collective is realized
//! as worker sends + coordinator reduction + coordinator fan-out, which
//! preserves the all-ranks-must-participate contract.

use super::{Communicator, read_frame, read_u64, write_frame, write_u64};
use anyhow::{Context, Result, bail, ensure};
use std::net::{TcpListener, TcpStream};

#[derive(Debug)]
enum Links {
    /// Streams for ranks 1..world, indexed by rank - 1.
    Coordinator { peers: Vec<TcpStream> },
    Worker { coordinator: TcpStream },
}

#[derive(Debug)]
pub struct TcpCommunicator {
    rank: usize,
    world: usize,
    links: Links,
}

impl TcpCommunicator {
    /// Rank 0: accept one connection per remaining rank. Each peer opens
    /// with a scalar announcing its rank.
    pub fn coordinator(listener: TcpListener, world: usize) -> Result<Self> {
        ensure!(world >= 1, "world size must be at least 1");

        let mut peers: Vec<Option<TcpStream>> = (1..world).map(|_| None).collect();
        for _ in 1..world {
            let (mut stream, addr) = listener
                .accept()
                .context("failed to accept worker connection")?;
            stream.set_nodelay(true).ok();

            let rank = read_u64(&mut stream)
                .with_context(|| format!("no rank announcement from {addr}"))? as usize;
            ensure!(rank >= 1 && rank < world, "peer {addr} announced invalid rank {rank}");
            ensure!(peers[rank - 1].is_none(), "rank {rank} connected twice");
            peers[rank - 1] = Some(stream);
        }

        let peers = peers
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .context("not every rank connected")?;

        Ok(Self { rank: 0, world, links: Links::Coordinator { peers } })
    }

    /// Ranks 1..world: connect to the coordinator and announce the rank.
    pub fn connect(coordinator: &str, rank: usize, world: usize) -> Result<Self> {
        ensure!(rank >= 1 && rank < world, "worker rank {rank} out of range for world {world}");

        let mut stream = TcpStream::connect(coordinator)
            .with_context(|| format!("cannot reach coordinator at {coordinator}"))?;
        stream.set_nodelay(true).ok();
        write_u64(&mut stream, rank as u64).context("failed to announce rank")?;

        Ok(Self { rank, world, links: Links::Worker { coordinator: stream } })
    }
}

impl Communicator for TcpCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.world
    }

    fn broadcast_u64(&mut self, value: u64) -> Result<u64> {
        match &mut self.links {
            Links::Coordinator { peers } => {
                for peer in peers.iter_mut() {
                    write_u64(peer, value).context("broadcast send failed")?;
                }
                Ok(value)
            }
            Links::Worker { coordinator } => {
                read_u64(coordinator).context("broadcast receive failed")
            }
        }
    }

    fn all_reduce_sum(&mut self, value: u64) -> Result<u64> {
        match &mut self.links {
            Links::Coordinator { peers } => {
                let mut total = value;
                for peer in peers.iter_mut() {
                    total += read_u64(peer).context("reduction receive failed")?;
                }
                for peer in peers.iter_mut() {
                    write_u64(peer, total).context("reduction send failed")?;
                }
                Ok(total)
            }
            Links::Worker { coordinator } => {
                write_u64(coordinator, value).context("reduction send failed")?;
                read_u64(coordinator).context("reduction receive failed")
            }
        }
    }

    fn all_gather(&mut self, payload: &[u8]) -> Result<Vec<Vec<u8>>> {
        match &mut self.links {
            Links::Coordinator { peers } => {
                let mut frames = Vec::with_capacity(self.world);
                frames.push(payload.to_vec());
                for peer in peers.iter_mut() {
                    frames.push(read_frame(peer).context("gather receive failed")?);
                }
                for peer in peers.iter_mut() {
                    for frame in &frames {
                        write_frame(peer, frame).context("gather send failed")?;
                    }
                }
                Ok(frames)
            }
            Links::Worker { coordinator } => {
                write_frame(coordinator, payload).context("gather send failed")?;
                let mut frames = Vec::with_capacity(self.world);
                for _ in 0..self.world {
                    frames.push(read_frame(coordinator).context("gather receive failed")?);
                }
                Ok(frames)
            }
        }
    }

    fn barrier(&mut self) -> Result<()> {
        match &mut self.links {
            Links::Coordinator { peers } => {
                for peer in peers.iter_mut() {
                    read_u64(peer).context("barrier receive failed")?;
                }
                for peer in peers.iter_mut() {
                    write_u64(peer, 0).context("barrier send failed")?;
                }
                Ok(())
            }
            Links::Worker { coordinator } => {
                write_u64(coordinator, 0).context("barrier send failed")?;
                read_u64(coordinator).context("barrier receive failed")?;
                Ok(())
            }
        }
    }

    fn send_u64(&mut self, rank: usize, value: u64) -> Result<()> {
        let Links::Coordinator { peers } = &mut self.links else {
            bail!("only the coordinator sends point-to-point");
        };
        ensure!(rank >= 1 && rank < self.world, "no such rank {rank}");
        write_u64(&mut peers[rank - 1], value).context("point-to-point send failed")
    }

    fn send_frame(&mut self, rank: usize, payload: &[u8]) -> Result<()> {
        let Links::Coordinator { peers } = &mut self.links else {
            bail!("only the coordinator sends point-to-point");
        };
        ensure!(rank >= 1 && rank < self.world, "no such rank {rank}");
        write_frame(&mut peers[rank - 1], payload).context("point-to-point send failed")
    }

    fn recv_u64(&mut self) -> Result<u64> {
        let Links::Worker { coordinator } = &mut self.links else {
            bail!("the coordinator has no one to receive from");
        };
        read_u64(coordinator).context("point-to-point receive failed")
    }

    fn recv_frame(&mut self) -> Result<Vec<u8>> {
        let Links::Worker { coordinator } = &mut self.links else {
            bail!("the coordinator has no one to receive from");
        };
        read_frame(coordinator).context("point-to-point receive failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    /// Build a world of `size` communicators over loopback, run `body`
    /// on each rank in its own thread, and return the results in rank
    /// order.
    fn with_world<T, F>(size: usize, body: F) -> Vec<T>
    where
        T: Send + 'static,
        F: Fn(TcpCommunicator) -> T + Send + Sync + Clone + 'static,
    {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let mut handles = Vec::new();
        for rank in 1..size {
            let addr = addr.clone();
            let body = body.clone();
            handles.push(thread::spawn(move || {
                let comm = TcpCommunicator::connect(&addr, rank, size).unwrap();
                body(comm)
            }));
        }

        let comm = TcpCommunicator::coordinator(listener, size).unwrap();
        let mut results = vec![body(comm)];
        for handle in handles {
            results.push(handle.join().unwrap());
        }
        results
    }

    #[test]
    fn test_broadcast_from_coordinator() {
        let values = with_world(3, |mut comm| {
            let seed = if comm.is_coordinator() { 17 } else { 0 };
            comm.broadcast_u64(seed).unwrap()
        });
        assert_eq!(values, vec![17, 17, 17]);
    }

    #[test]
    fn test_all_reduce_sums_every_rank() {
        let values = with_world(3, |mut comm| {
            let local = (comm.rank() + 1) as u64;
            comm.all_reduce_sum(local).unwrap()
        });
        assert_eq!(values, vec![6, 6, 6]);
    }

    #[test]
    fn test_all_gather_orders_by_rank() {
        let gathered = with_world(3, |mut comm| {
            let payload = format!("rank-{}", comm.rank());
            comm.all_gather(payload.as_bytes()).unwrap()
        });
        for frames in gathered {
            let frames: Vec<String> =
                frames.into_iter().map(|f| String::from_utf8(f).unwrap()).collect();
            assert_eq!(frames, vec!["rank-0", "rank-1", "rank-2"]);
        }
    }

    #[test]
    fn test_barrier_and_point_to_point() {
        let received = with_world(2, |mut comm| {
            if comm.is_coordinator() {
                comm.send_u64(1, 2).unwrap();
                comm.send_frame(1, b"x,y").unwrap();
                comm.barrier().unwrap();
                None
            } else {
                let count = comm.recv_u64().unwrap();
                let frame = comm.recv_frame().unwrap();
                comm.barrier().unwrap();
                Some((count, frame))
            }
        });
        assert_eq!(received[1], Some((2, b"x,y".to_vec())));
    }

    #[test]
    fn test_single_rank_world_degenerates() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let mut comm = TcpCommunicator::coordinator(listener, 1).unwrap();
        assert_eq!(comm.broadcast_u64(9).unwrap(), 9);
        assert_eq!(comm.all_reduce_sum(4).unwrap(), 4);
        assert_eq!(comm.all_gather(b"solo").unwrap(), vec![b"solo".to_vec()]);
        comm.barrier().unwrap();
    }
}

//! # Transport — Point-to-Point Mark Array Exchange
//!
//! Workers exchange exactly one kind of message: a non-collector rank sends
//! its segment `MarkArray` to the collector under `SEGMENT_TAG`. The
//! `Transport` trait is the seam between the SPMD worker body and whatever
//! carries the bytes; `ChannelTransport` is the in-process implementation,
//! one endpoint per rank wired together with `std::sync::mpsc`.
//!
//! ## Ordering
//!
//! The collector receives in a pinned order (rank 1, 2, …) because it
//! recomputes each peer's slice from `partition` to size the receive buffer.
//! Senders may finish in any order. A message that arrives before it is
//! asked for is parked in the endpoint's pending queue and handed out when
//! its (source, tag) is requested.
//!
//! ## Length Check
//!
//! `recv_into` receives into a buffer the caller has already sized to the
//! expected length. A message of any other length is a `LengthMismatch`
//! error; nothing is truncated or over-read.
//!
//! ## Blocking
//!
//! Sends never block (unbounded channel). Receives block until the message
//! arrives, until `recv_timeout` elapses (`RecvTimeout`), or until every
//! sender has hung up (`Disconnected`).

use std::collections::VecDeque;
use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::{Result, SieveError};
use crate::sieve::MarkArray;

/// Zero-based worker index.
pub type Rank = usize;

/// The rank that gathers every segment and emits the result.
pub const COLLECTOR_RANK: Rank = 0;

/// Channel identifier carried by every message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tag(pub u32);

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tag for segment mark arrays sent to the collector.
pub const SEGMENT_TAG: Tag = Tag(0);

/// Blocking point-to-point messaging between the ranks of a fixed world.
pub trait Transport: Send {
    /// This endpoint's rank.
    fn rank(&self) -> Rank;

    /// Number of ranks in the world.
    fn size(&self) -> usize;

    /// Hand `marks` to `dest`. Ownership moves into the message.
    fn send(&self, dest: Rank, tag: Tag, marks: MarkArray) -> Result<()>;

    /// Block until the message from `source` with `tag` arrives and copy it
    /// into `buffer`, whose length is the expected message length.
    fn recv_into(&mut self, source: Rank, tag: Tag, buffer: &mut MarkArray) -> Result<()>;
}

/// A message in flight.
#[derive(Debug)]
struct Envelope {
    source: Rank,
    tag: Tag,
    marks: MarkArray,
}

/// In-process endpoint backed by `std::sync::mpsc` channels.
///
/// An endpoint holds no sender into its own inbox, so once every peer has
/// dropped its endpoint a blocked receive fails with `Disconnected` instead
/// of waiting forever.
pub struct ChannelTransport {
    rank: Rank,
    peers: Vec<Option<Sender<Envelope>>>,
    inbox: Receiver<Envelope>,
    pending: VecDeque<Envelope>,
    recv_timeout: Option<Duration>,
}

impl ChannelTransport {
    /// Build a fully connected world of `size` endpoints, indexed by rank.
    pub fn world(size: usize, recv_timeout: Option<Duration>) -> Vec<ChannelTransport> {
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..size).map(|_| mpsc::channel()).unzip();
        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| ChannelTransport {
                rank,
                peers: senders
                    .iter()
                    .enumerate()
                    .map(|(peer, tx)| (peer != rank).then(|| tx.clone()))
                    .collect(),
                inbox,
                pending: VecDeque::new(),
                recv_timeout,
            })
            .collect()
    }

    fn check_rank(&self, rank: Rank) -> Result<()> {
        if rank >= self.peers.len() {
            return Err(SieveError::InvalidRank {
                rank,
                size: self.peers.len(),
            });
        }
        Ok(())
    }

    fn take_pending(&mut self, source: Rank, tag: Tag) -> Option<Envelope> {
        let pos = self
            .pending
            .iter()
            .position(|e| e.source == source && e.tag == tag)?;
        self.pending.remove(pos)
    }

    /// Pull from the inbox until the wanted message shows up, parking others.
    fn wait_for(&mut self, source: Rank, tag: Tag) -> Result<Envelope> {
        let deadline = self.recv_timeout.map(|t| (Instant::now() + t, t));
        loop {
            let next = match deadline {
                Some((deadline, timeout)) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    self.inbox.recv_timeout(remaining).map_err(|e| match e {
                        RecvTimeoutError::Timeout => SieveError::RecvTimeout {
                            source_rank: source,
                            waited_ms: timeout.as_millis(),
                        },
                        RecvTimeoutError::Disconnected => SieveError::Disconnected { peer: source },
                    })?
                }
                None => self
                    .inbox
                    .recv()
                    .map_err(|_| SieveError::Disconnected { peer: source })?,
            };

            if next.source == source && next.tag == tag {
                return Ok(next);
            }
            trace!(
                rank = self.rank,
                from = next.source,
                tag = %next.tag,
                "parking out-of-order message"
            );
            self.pending.push_back(next);
        }
    }
}

impl Transport for ChannelTransport {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    fn send(&self, dest: Rank, tag: Tag, marks: MarkArray) -> Result<()> {
        self.check_rank(dest)?;
        let Some(peer) = &self.peers[dest] else {
            return Err(SieveError::SelfSend(self.rank));
        };
        debug!(rank = self.rank, dest, tag = %tag, len = marks.len(), "send");
        peer.send(Envelope {
            source: self.rank,
            tag,
            marks,
        })
        .map_err(|_| SieveError::Disconnected { peer: dest })
    }

    fn recv_into(&mut self, source: Rank, tag: Tag, buffer: &mut MarkArray) -> Result<()> {
        self.check_rank(source)?;
        let envelope = match self.take_pending(source, tag) {
            Some(envelope) => envelope,
            None => self.wait_for(source, tag)?,
        };

        if envelope.marks.len() != buffer.len() {
            return Err(SieveError::LengthMismatch {
                source_rank: source,
                tag,
                expected: buffer.len(),
                actual: envelope.marks.len(),
            });
        }
        buffer.copy_from(&envelope.marks);
        debug!(rank = self.rank, from = source, tag = %tag, len = buffer.len(), "recv");
        Ok(())
    }
}

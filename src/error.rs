//! Error types for the distributed sieve.

use thiserror::Error;

use crate::transport::{Rank, Tag};

/// Every failure the core can report.
///
/// Startup validation errors (`InvalidWorkerCount`, `InvalidLimit`) are
/// returned before any worker is launched. Transport errors are detected at
/// the collector and abort the merge; a partial prime list is never produced.
#[derive(Error, Debug)]
pub enum SieveError {
    #[error("worker count must be at least 1, got {0}")]
    InvalidWorkerCount(usize),

    #[error("upper bound must be at least 2, got {0}")]
    InvalidLimit(u64),

    #[error("rank {rank} is outside a world of {size} workers")]
    InvalidRank { rank: Rank, size: usize },

    #[error("rank {0} cannot send to itself")]
    SelfSend(Rank),

    #[error("message from rank {source_rank} (tag {tag}) carries {actual} marks, expected {expected}")]
    LengthMismatch {
        source_rank: Rank,
        tag: Tag,
        expected: usize,
        actual: usize,
    },

    #[error("timed out after {waited_ms} ms waiting for rank {source_rank}")]
    RecvTimeout { source_rank: Rank, waited_ms: u128 },

    #[error("rank {peer} disconnected before the exchange completed")]
    Disconnected { peer: Rank },

    #[error("worker rank {0} panicked")]
    WorkerPanicked(Rank),

    #[error("failed to spawn worker rank {rank}: {source}")]
    ThreadSpawn {
        rank: Rank,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for sieve operations.
pub type Result<T> = std::result::Result<T, SieveError>;

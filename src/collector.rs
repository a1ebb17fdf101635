//! # Collector — Merging Segments into the Final Prime List
//!
//! Runs only on `COLLECTOR_RANK`. The result is the concatenation of
//!
//! 1. the base primes (ascending),
//! 2. the collector's own segment primes (ascending),
//! 3. every other rank's segment primes, rank 1 through P − 1.
//!
//! Slices are contiguous, increasing with rank, and all lie above b, so
//! concatenation in this order is already strictly ascending. No sort step.
//!
//! A single receive buffer is allocated up front at the largest slice length
//! and reset to each peer's exact expected length before its message is
//! copied in. A peer's primes are fully drained into the result before the
//! buffer is reused.

use std::io::{self, Write};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::partition::{partition, segment_lengths, Segment};
use crate::reference::estimate_prime_count;
use crate::sieve::{segment_primes, MarkArray};
use crate::transport::{Transport, COLLECTOR_RANK, SEGMENT_TAG};

/// Final ordered primes of one run. Built once by `gather`, never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    limit: u64,
    workers: usize,
    primes: Vec<u64>,
}

impl ResultSet {
    /// Upper bound n of the searched range [2, n].
    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn primes(&self) -> &[u64] {
        &self.primes
    }

    pub fn len(&self) -> usize {
        self.primes.len()
    }

    pub fn into_primes(self) -> Vec<u64> {
        self.primes
    }

    /// Human-readable report: header banner, one line of primes, footer.
    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "Finding all primes in the range from 2 to {} with {} workers.",
            self.limit, self.workers
        )?;
        writeln!(out)?;
        write!(out, "The prime numbers are:")?;
        for p in &self.primes {
            write!(out, " {}", p)?;
        }
        writeln!(out)?;
        writeln!(out)?;
        writeln!(out, "Finished. Exiting")?;
        Ok(())
    }
}

/// Receive every peer's marks in rank order and assemble the result.
///
/// `own` and `own_marks` are the collector's own slice and its marks.
/// Any transport failure aborts the merge; no partial result is returned.
pub fn gather<T: Transport>(
    transport: &mut T,
    n: u64,
    base_primes: &[u64],
    own: Segment,
    own_marks: &MarkArray,
) -> Result<ResultSet> {
    debug_assert_eq!(transport.rank(), COLLECTOR_RANK);
    let workers = transport.size();

    let mut primes = Vec::with_capacity(estimate_prime_count(n));
    primes.extend_from_slice(base_primes);
    primes.extend(segment_primes(own, own_marks));

    let largest = segment_lengths(n, workers).into_iter().max().unwrap_or(0);
    let mut buffer = MarkArray::new(largest);

    for rank in (0..workers).filter(|&r| r != COLLECTOR_RANK) {
        let segment = partition(n, workers, rank);
        buffer.reset(segment.len());
        transport.recv_into(rank, SEGMENT_TAG, &mut buffer)?;

        let before = primes.len();
        primes.extend(segment_primes(segment, &buffer));
        debug!(
            rank,
            low = segment.low,
            high = segment.high,
            primes = primes.len() - before,
            "merged segment"
        );
    }

    debug_assert!(
        primes.windows(2).all(|w| w[0] < w[1]),
        "merged primes must be strictly ascending"
    );
    info!(limit = n, workers, primes = primes.len(), "gather complete");

    Ok(ResultSet {
        limit: n,
        workers,
        primes,
    })
}

#[cfg(test)]
mod tests {
    //! Collector tests drive `gather` over a `ChannelTransport` world with the
    //! peer messages pre-sent, so no threads are needed.

    use super::*;
    use crate::error::SieveError;
    use crate::sieve::{sieve_segment, BaseSieve};
    use crate::transport::ChannelTransport;

    /// Compute and send every non-collector segment, then gather at rank 0.
    fn gather_world(n: u64, workers: usize) -> Result<ResultSet> {
        let mut world = ChannelTransport::world(workers, None);
        let base = BaseSieve::new(n).primes();
        for rank in 1..workers {
            let marks = sieve_segment(&base, partition(n, workers, rank));
            world[rank].send(COLLECTOR_RANK, SEGMENT_TAG, marks)?;
        }
        let own = partition(n, workers, 0);
        let own_marks = sieve_segment(&base, own);
        gather(&mut world[0], n, &base, own, &own_marks)
    }

    #[test]
    fn gather_thirty_three_workers() {
        let result = gather_world(30, 3).unwrap();
        assert_eq!(result.primes(), &[2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert_eq!(result.workers(), 3);
        assert_eq!(result.limit(), 30);
    }

    #[test]
    fn gather_hundred_four_workers() {
        let result = gather_world(100, 4).unwrap();
        assert_eq!(result.len(), 25);
        assert_eq!(result.primes().last(), Some(&97));
    }

    #[test]
    fn gather_with_empty_segments() {
        // n = 10: seven segment elements across twelve workers
        let result = gather_world(10, 12).unwrap();
        assert_eq!(result.primes(), &[2, 3, 5, 7]);
    }

    /// A peer whose array disagrees with the recomputed slice length aborts
    /// the whole merge.
    #[test]
    fn gather_rejects_wrong_length() {
        let mut world = ChannelTransport::world(2, None);
        world[1]
            .send(COLLECTOR_RANK, SEGMENT_TAG, MarkArray::new(3))
            .unwrap();
        let base = BaseSieve::new(100).primes();
        let own = partition(100, 2, 0);
        let own_marks = sieve_segment(&base, own);
        let err = gather(&mut world[0], 100, &base, own, &own_marks).unwrap_err();
        assert!(matches!(
            err,
            SieveError::LengthMismatch {
                source_rank: 1,
                expected: 45,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn report_layout() {
        let result = gather_world(10, 2).unwrap();
        let mut out = Vec::new();
        result.write_report(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Finding all primes in the range from 2 to 10 with 2 workers.\n\
             \n\
             The prime numbers are: 2 3 5 7\n\
             \n\
             Finished. Exiting\n"
        );
    }

    #[test]
    fn serializes_to_json() {
        let result = gather_world(10, 1).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["limit"], 10);
        assert_eq!(json["workers"], 1);
        assert_eq!(json["primes"], serde_json::json!([2, 3, 5, 7]));
    }
}

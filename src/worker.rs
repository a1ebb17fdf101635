//! # Worker — SPMD Body and Launcher
//!
//! Every rank runs the same `run_worker` body:
//!
//! 1. compute its slice with `partition` (pure, no shared state),
//! 2. sieve the base region [2, b] (redundantly, on every rank),
//! 3. sieve its own slice with the base primes,
//! 4. non-collector ranks send their marks to `COLLECTOR_RANK` and finish;
//!    the collector gathers every peer in rank order.
//!
//! Steps 1–3 involve no communication and run fully in parallel across
//! ranks. The only synchronization is the collector's sequence of receives.
//!
//! `run` launches exactly P worker threads (named `rank-<r>`), one per
//! `ChannelTransport` endpoint, inside a `std::thread::scope`, and returns the
//! collector's `ResultSet`.

use std::thread;

use tracing::{debug, info, info_span, warn};

use crate::collector::{gather, ResultSet};
use crate::config::RunConfig;
use crate::error::{Result, SieveError};
use crate::partition::partition;
use crate::sieve::{sieve_segment, BaseSieve};
use crate::transport::{ChannelTransport, Rank, Transport, COLLECTOR_RANK, SEGMENT_TAG};

/// SPMD body for one rank. Returns the merged result on the collector and
/// `None` everywhere else.
pub fn run_worker<T: Transport>(transport: &mut T, n: u64) -> Result<Option<ResultSet>> {
    let rank = transport.rank();
    let workers = transport.size();

    let segment = partition(n, workers, rank);
    let base = BaseSieve::new(n);
    let base_primes = base.primes();
    if segment.is_empty() {
        debug!(rank, "empty segment, nothing to mark");
    }
    let marks = sieve_segment(&base_primes, segment);
    debug!(
        rank,
        low = segment.low,
        high = segment.high,
        base_primes = base_primes.len(),
        unmarked = marks.count_unmarked(),
        "segment sieved"
    );

    if rank != COLLECTOR_RANK {
        transport.send(COLLECTOR_RANK, SEGMENT_TAG, marks)?;
        return Ok(None);
    }
    gather(transport, n, &base_primes, segment, &marks).map(Some)
}

/// Run the whole distributed sieve described by `config`.
pub fn run(config: &RunConfig) -> Result<ResultSet> {
    let n = config.limit();
    let workers = config.workers();
    info!(limit = n, workers, "starting distributed sieve");

    let world = ChannelTransport::world(workers, config.recv_timeout());
    let outcomes: Vec<(Rank, Result<Option<ResultSet>>)> = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for mut endpoint in world {
            let rank = endpoint.rank();
            let spawned = thread::Builder::new()
                .name(format!("rank-{}", rank))
                .spawn_scoped(scope, move || {
                    let _span = info_span!("worker", rank).entered();
                    run_worker(&mut endpoint, n)
                });
            match spawned {
                Ok(handle) => handles.push((rank, Ok(handle))),
                Err(source) => handles.push((rank, Err(SieveError::ThreadSpawn { rank, source }))),
            }
        }
        handles
            .into_iter()
            .map(|(rank, handle)| {
                let outcome = match handle {
                    Ok(handle) => handle
                        .join()
                        .unwrap_or(Err(SieveError::WorkerPanicked(rank))),
                    Err(e) => Err(e),
                };
                (rank, outcome)
            })
            .collect()
    });

    collect_outcomes(outcomes)
}

/// Pick the collector's result. Its error wins over secondary peer failures,
/// which only happen because the collector already gave up.
fn collect_outcomes(outcomes: Vec<(Rank, Result<Option<ResultSet>>)>) -> Result<ResultSet> {
    let mut collected = None;
    let mut peer_error = None;
    for (rank, outcome) in outcomes {
        match outcome {
            Ok(Some(result)) => collected = Some(Ok(result)),
            Ok(None) => {}
            Err(e) if rank == COLLECTOR_RANK => collected = Some(Err(e)),
            Err(e) => {
                warn!(rank, error = %e, "worker failed");
                peer_error.get_or_insert(e);
            }
        }
    }
    match (collected, peer_error) {
        (Some(outcome), _) => outcome,
        (None, Some(e)) => Err(e),
        (None, None) => Err(SieveError::Disconnected {
            peer: COLLECTOR_RANK,
        }),
    }
}

#[cfg(test)]
mod tests {
    //! Launcher tests: full threaded runs for the worked examples, the
    //! empty-segment case, and outcome selection when ranks fail.

    use super::*;
    use crate::reference::primes_up_to;

    fn run_primes(workers: usize, n: u64) -> Vec<u64> {
        let config = RunConfig::new(workers, n).unwrap();
        run(&config).unwrap().into_primes()
    }

    #[test]
    fn thirty_single_worker() {
        assert_eq!(run_primes(1, 30), vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    }

    #[test]
    fn thirty_is_partition_invariant() {
        assert_eq!(run_primes(3, 30), run_primes(1, 30));
    }

    #[test]
    fn hundred_four_workers() {
        assert_eq!(run_primes(4, 100).len(), 25);
    }

    /// n = 2: base region empty, the last rank owns {2}.
    #[test]
    fn smallest_limit() {
        assert_eq!(run_primes(1, 2), vec![2]);
        assert_eq!(run_primes(3, 2), vec![2]);
        assert_eq!(run_primes(2, 3), vec![2, 3]);
    }

    #[test]
    fn more_workers_than_segment_region() {
        assert_eq!(run_primes(16, 20), primes_up_to(20));
    }

    #[test]
    fn matches_reference_at_larger_limit() {
        assert_eq!(run_primes(7, 200_003), primes_up_to(200_003));
    }

    // ── Outcome selection ───────────────────────────────────────────

    #[test]
    fn collector_error_wins() {
        let outcomes = vec![
            (0, Err(SieveError::RecvTimeout { source_rank: 1, waited_ms: 5 })),
            (1, Err(SieveError::Disconnected { peer: 0 })),
        ];
        assert!(matches!(
            collect_outcomes(outcomes),
            Err(SieveError::RecvTimeout { source_rank: 1, .. })
        ));
    }

    #[test]
    fn peer_error_surfaces_without_collector_result() {
        let outcomes = vec![(1, Err(SieveError::WorkerPanicked(1))), (2, Ok(None))];
        assert!(matches!(
            collect_outcomes(outcomes),
            Err(SieveError::WorkerPanicked(1))
        ));
    }
}

//! # Verify — Cross-Checking the Distributed Sieve Against the Oracle
//!
//! The distributed result must not depend on the worker count. `cross_check`
//! runs the full SPMD sieve once per worker count in 1..=max_workers and
//! compares each prime list with `reference::primes_up_to(n)`.
//!
//! The runs are independent, so they are spread over the rayon pool. Each run
//! still spawns its own dedicated worker threads; rayon only schedules whole
//! runs, never individual ranks, so a blocked collector cannot starve its
//! own peers.

use rayon::prelude::*;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::error::Result;
use crate::reference::primes_up_to;
use crate::worker::run;

/// Outcome of one distributed run compared with the oracle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CrossCheck {
    pub workers: usize,
    /// Primes reported by the distributed run.
    pub found: usize,
    /// Primes reported by the oracle.
    pub expected: usize,
    /// True when both lists are identical element by element.
    pub matches: bool,
}

/// Compare the distributed sieve for every worker count 1..=`max_workers`
/// with the single-process oracle, ordered by worker count.
pub fn cross_check(
    n: u64,
    max_workers: usize,
    recv_timeout: Option<Duration>,
) -> Result<Vec<CrossCheck>> {
    // Validate once up front so a bad n fails before any run is launched
    RunConfig::new(max_workers, n)?;
    let expected = primes_up_to(n);

    let mut checks = (1..=max_workers)
        .into_par_iter()
        .map(|workers| {
            let config = RunConfig::new(workers, n)?.with_recv_timeout(recv_timeout);
            let result = run(&config)?;
            let check = CrossCheck {
                workers,
                found: result.len(),
                expected: expected.len(),
                matches: result.primes() == expected.as_slice(),
            };
            if !check.matches {
                warn!(workers, found = check.found, expected = check.expected, "mismatch");
            }
            Ok(check)
        })
        .collect::<Result<Vec<_>>>()?;
    checks.sort_by_key(|c| c.workers);

    let failures = checks.iter().filter(|c| !c.matches).count();
    info!(limit = n, runs = checks.len(), failures, "cross-check complete");
    Ok(checks)
}

//! # Partition — Splitting the Search Range Across Workers
//!
//! The search range [2, n] is cut at the boundary b = floor(sqrt(n)):
//!
//! - the **base region** [2, b] is sieved redundantly by every worker, and
//! - the **segment region** (b, n] is divided into one contiguous slice per
//!   rank.
//!
//! With R = n − b elements in the segment region and P workers, each rank
//! gets `split = R / P` elements starting at `b + rank·split + 1`; the last
//! rank additionally absorbs the `R mod P` remainder. The slices are pairwise
//! disjoint and their union is exactly (b, n].
//!
//! `partition` is a pure function of (n, P, rank). The collector calls it for
//! every peer to know how long each incoming mark array must be, so sender and
//! receiver always agree on the layout.
//!
//! When R < P every rank but the last receives an empty slice. Empty slices
//! are ordinary values (`Segment::is_empty`) and every consumer treats them as
//! a no-op.

use serde::Serialize;

use crate::transport::Rank;

/// Exact integer square root: the largest r with r·r ≤ n.
pub fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    // Float estimate, then correct the last-ulp error for large n
    let mut r = (n as f64).sqrt() as u64;
    while r.checked_mul(r).map_or(true, |sq| sq > n) {
        r -= 1;
    }
    while (r + 1).checked_mul(r + 1).is_some_and(|sq| sq <= n) {
        r += 1;
    }
    r
}

/// Upper end of the base region, floor(sqrt(n)).
#[inline]
pub fn boundary(n: u64) -> u64 {
    isqrt(n)
}

/// Inclusive slice [low, high] of the segment region owned by one rank.
///
/// Empty when `high < low`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub low: u64,
    pub high: u64,
}

impl Segment {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.high < self.low
    }

    /// Number of integers in the slice.
    #[inline]
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.high - self.low + 1) as usize
        }
    }

    /// Ascending iterator over the integers in the slice.
    pub fn iter(&self) -> impl Iterator<Item = u64> {
        // low ≥ 2 for every partitioned slice, so `low..=high` with high = low − 1 is empty
        self.low..=self.high
    }
}

/// Slice of (b, n] owned by `rank` out of `workers`.
///
/// Callers guarantee `workers ≥ 1` and `rank < workers`; `RunConfig`
/// validates both before any worker starts.
pub fn partition(n: u64, workers: usize, rank: Rank) -> Segment {
    debug_assert!(workers >= 1, "partition needs at least one worker");
    debug_assert!(rank < workers, "rank {} out of range for {} workers", rank, workers);

    let b = boundary(n);
    let region = n - b;
    let p = workers as u64;
    let split = region / p;
    let remainder = region % p;

    let low = b + rank as u64 * split + 1;
    let mut high = low + split - 1;
    if rank == workers - 1 {
        high += remainder;
    }
    Segment { low, high }
}

/// Length of every rank's slice, in rank order.
pub fn segment_lengths(n: u64, workers: usize) -> Vec<usize> {
    (0..workers)
        .map(|rank| partition(n, workers, rank).len())
        .collect()
}

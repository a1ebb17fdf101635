//! # Sieve — Base Primes and Segment Marking
//!
//! Two marking passes run on every worker without any communication:
//!
//! 1. **Base sieve** (`BaseSieve`): classic sieve of Eratosthenes over
//!    [0, b] with b = floor(sqrt(n)). Every worker computes it redundantly;
//!    the result is both part of the final prime list and the divisor set
//!    for the segment pass. Cost O(b log log b), negligible next to the
//!    segment work once n ≫ P².
//! 2. **Segment sieve** (`sieve_segment`): for each base prime p, mark every
//!    multiple of p inside the worker's [low, high], starting from
//!    p·ceil(low/p). Cost O((high − low)/p) per prime.
//!
//! Marks are kept in a `MarkArray`, a packed u64 bitmap (8× smaller than
//! `Vec<bool>`). A set bit means the integer at that offset is composite; an
//! offset still clear after the segment pass is prime. Since low > b ≥ p for
//! every base prime, no base prime can mark itself inside a segment.

use crate::partition::{boundary, Segment};

/// Packed composite flags over a contiguous range of integers.
///
/// Bit layout: offset `i` lives in word `i / 64`, bit `i % 64`. Bits beyond
/// `len` in the last word are always clear.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct MarkArray {
    words: Vec<u64>,
    len: usize,
}

impl MarkArray {
    /// Create an array of `len` flags, all clear (every candidate unmarked).
    pub fn new(len: usize) -> Self {
        MarkArray {
            words: vec![0u64; len.div_ceil(64)],
            len,
        }
    }

    /// Number of flags in this array.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the integer at `offset` was marked composite.
    #[inline]
    pub fn is_marked(&self, offset: usize) -> bool {
        debug_assert!(
            offset < self.len,
            "MarkArray offset out of bounds: {} >= {}",
            offset,
            self.len
        );
        self.words[offset / 64] & (1u64 << (offset % 64)) != 0
    }

    /// Flag the integer at `offset` as composite.
    #[inline]
    pub fn mark(&mut self, offset: usize) {
        debug_assert!(offset < self.len);
        self.words[offset / 64] |= 1u64 << (offset % 64);
    }

    /// Count of offsets never marked.
    pub fn count_unmarked(&self) -> usize {
        let marked: usize = self.words.iter().map(|w| w.count_ones() as usize).sum();
        self.len - marked
    }

    /// Offsets never marked, in ascending order.
    pub fn unmarked_offsets(&self) -> impl Iterator<Item = usize> + '_ {
        let len = self.len;
        self.words.iter().enumerate().flat_map(move |(wi, &word)| {
            let base = wi * 64;
            // Invert, then drop the padding bits past `len` in the last word
            let valid = len - base;
            let mask = if valid >= 64 { u64::MAX } else { (1u64 << valid) - 1 };
            ClearBits {
                word: !word & mask,
                base,
            }
        })
    }

    /// Clear every flag and resize to `len`, keeping the allocation when it
    /// is large enough.
    pub fn reset(&mut self, len: usize) {
        self.words.clear();
        self.words.resize(len.div_ceil(64), 0);
        self.len = len;
    }

    /// Overwrite this array with the contents of `other`.
    ///
    /// Lengths must already agree; the transport checks that before copying.
    pub fn copy_from(&mut self, other: &MarkArray) {
        debug_assert_eq!(self.len, other.len);
        self.words.copy_from_slice(&other.words);
    }
}

/// Iterator over the set bits of one inverted word.
struct ClearBits {
    word: u64,
    base: usize,
}

impl Iterator for ClearBits {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.word == 0 {
            return None;
        }
        let tz = self.word.trailing_zeros() as usize;
        self.word &= self.word - 1; // clear lowest set bit
        Some(self.base + tz)
    }
}

/// Marks over [0, b] where b = floor(sqrt(n)).
///
/// Offsets 0 and 1 are marked up front so the unmarked offsets are exactly
/// the primes ≤ b.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseSieve {
    bound: u64,
    marks: MarkArray,
}

impl BaseSieve {
    pub fn new(n: u64) -> Self {
        let bound = boundary(n);
        let size = bound as usize + 1;
        let mut marks = MarkArray::new(size);
        marks.mark(0);
        if size > 1 {
            marks.mark(1);
        }

        let mut i = 2usize;
        while i * i < size {
            if !marks.is_marked(i) {
                let mut m = i * i;
                while m < size {
                    marks.mark(m);
                    m += i;
                }
            }
            i += 1;
        }
        BaseSieve { bound, marks }
    }

    /// floor(sqrt(n)), the last integer of the base region.
    #[inline]
    pub fn bound(&self) -> u64 {
        self.bound
    }

    /// Primes in [2, b], ascending.
    pub fn primes(&self) -> Vec<u64> {
        self.marks.unmarked_offsets().map(|i| i as u64).collect()
    }
}

/// Mark every composite in `segment` using `base_primes` as divisors.
///
/// An empty segment yields an empty array without touching any prime.
pub fn sieve_segment(base_primes: &[u64], segment: Segment) -> MarkArray {
    let mut marks = MarkArray::new(segment.len());
    if segment.is_empty() {
        return marks;
    }

    let Segment { low, high } = segment;
    for &p in base_primes {
        // First multiple of p that is ≥ low; always ≥ 2p because low > b ≥ p
        let mut m = low.div_ceil(p) * p;
        while m <= high {
            marks.mark((m - low) as usize);
            m += p;
        }
    }
    marks
}

/// Primes of `segment` given its marks, ascending.
pub fn segment_primes(segment: Segment, marks: &MarkArray) -> impl Iterator<Item = u64> + '_ {
    debug_assert_eq!(segment.len(), marks.len());
    marks
        .unmarked_offsets()
        .map(move |offset| segment.low + offset as u64)
}

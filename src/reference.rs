//! # Reference — Single-Process Oracle
//!
//! An independent, non-partitioned sieve used to cross-check the distributed
//! result. It shares no code with the worker path: it is an odd-only sieve of
//! Eratosthenes over the whole of [2, n], one bit per odd integer (slot `i`
//! stands for 2i + 1), so even numbers never cost memory or marking work.
//!
//! Both paths use the same inclusive range [2, n].

use crate::partition::isqrt;

#[inline]
fn is_set(bits: &[u64], slot: usize) -> bool {
    bits[slot / 64] & (1u64 << (slot % 64)) != 0
}

/// All primes in [2, n], ascending.
pub fn primes_up_to(n: u64) -> Vec<u64> {
    if n < 2 {
        return Vec::new();
    }

    let slots = (n as usize + 1) / 2;
    let mut composite = vec![0u64; slots.div_ceil(64)];

    let root = isqrt(n) as usize;
    for p in (3..=root).step_by(2) {
        if is_set(&composite, p / 2) {
            continue;
        }
        // Slot of p², then every odd multiple: +2p in value is +p in slots
        for slot in (p * p / 2..slots).step_by(p) {
            composite[slot / 64] |= 1u64 << (slot % 64);
        }
    }

    let mut primes = Vec::with_capacity(estimate_prime_count(n));
    primes.push(2);
    primes.extend(
        (1..slots)
            .filter(|&slot| !is_set(&composite, slot))
            .map(|slot| 2 * slot as u64 + 1),
    );
    primes
}

/// Upper bound on π(n) (Rosser–Schoenfeld: π(x) < 1.25506·x / ln x for
/// x > 1), used to pre-size prime vectors.
pub fn estimate_prime_count(n: u64) -> usize {
    if n < 2 {
        return 0;
    }
    let nf = n as f64;
    (1.25506 * nf / nf.ln()).ceil() as usize
}

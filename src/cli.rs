//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim. Turns parsed
//! arguments into a validated `RunConfig`, runs the sieve, and writes the
//! report. Library errors are wrapped with `anyhow` context here and nowhere
//! else.

use anyhow::{Context, Result};
use spmd_sieve::{cross_check, run, RunConfig};
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tracing::{info, warn};

// ── Run ─────────────────────────────────────────────────────────

/// Run the distributed sieve and print the report on stdout.
pub fn run_sieve(workers: usize, limit: u64, timeout_ms: Option<u64>, json: bool) -> Result<()> {
    let config = RunConfig::new(workers, limit)
        .context("invalid startup arguments")?
        .with_recv_timeout(timeout_ms.map(Duration::from_millis));

    let start = Instant::now();
    let result = run(&config).context("distributed sieve failed")?;
    info!(
        primes = result.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "sieve finished"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer(&mut out, &result).context("failed to encode result")?;
        writeln!(out)?;
    } else {
        result
            .write_report(&mut out)
            .context("failed to write report")?;
    }
    out.flush()?;
    Ok(())
}

// ── Verify ──────────────────────────────────────────────────────

/// Cross-check every worker count against the oracle; fails if any differs.
pub fn run_verify(limit: u64, max_workers: usize, timeout_ms: Option<u64>) -> Result<()> {
    let checks = cross_check(limit, max_workers, timeout_ms.map(Duration::from_millis))
        .context("cross-check could not complete")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for check in &checks {
        writeln!(
            out,
            "workers={:<4} found={:<8} expected={:<8} {}",
            check.workers,
            check.found,
            check.expected,
            if check.matches { "ok" } else { "MISMATCH" }
        )?;
    }
    out.flush()?;

    let failures: Vec<usize> = checks
        .iter()
        .filter(|c| !c.matches)
        .map(|c| c.workers)
        .collect();
    if !failures.is_empty() {
        anyhow::bail!("distributed result differs from the serial sieve for worker counts {:?}", failures);
    }
    Ok(())
}

// ── Rayon Configuration ─────────────────────────────────────────

/// Configure the rayon global thread pool size.
pub fn configure_rayon(threads: Option<usize>) {
    let num_threads = threads.unwrap_or(0);
    if num_threads > 0 {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
        {
            warn!(error = %e, "Could not configure rayon thread pool");
        }
    }
}

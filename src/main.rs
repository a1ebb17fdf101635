//! # Main — CLI Entry Point
//!
//! Parses arguments, initialises logging and the rayon pool, and hands off to
//! `cli` for execution.
//!
//! ## Subcommands
//!
//! - `run <WORKERS> <LIMIT>`: distributed sieve over [2, LIMIT] with exactly
//!   WORKERS ranks; prints the prime report on stdout.
//! - `verify --limit N --max-workers K`: cross-check every worker count
//!   1..=K against the single-process oracle.
//!
//! ## Environment
//!
//! - `LOG_FORMAT=json`: JSON log lines instead of human-readable ones.
//! - `RUST_LOG`: log filter (default `info`).
//! - `SIEVE_TIMEOUT_MS`: fallback for `--timeout-ms`.
//!
//! A `.env` file in the working directory is loaded first.

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "spmd-sieve",
    about = "Find all primes in [2, n] with a fixed set of cooperating workers"
)]
struct Cli {
    /// Number of rayon threads used by `verify` (defaults to all logical cores)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sieve [2, LIMIT] across WORKERS ranks and print the primes
    Run {
        /// Number of workers (ranks); fixed for the whole run
        workers: usize,
        /// Inclusive upper bound n of the search range
        limit: u64,
        /// Give up if the collector waits longer than this for any worker
        #[arg(long, env = "SIEVE_TIMEOUT_MS")]
        timeout_ms: Option<u64>,
        /// Print the result as JSON instead of the text report
        #[arg(long)]
        json: bool,
    },
    /// Check every worker count 1..=MAX_WORKERS against the serial sieve
    Verify {
        /// Inclusive upper bound n of the search range
        #[arg(long)]
        limit: u64,
        /// Largest worker count to try
        #[arg(long, default_value_t = 8)]
        max_workers: usize,
        /// Per-receive timeout for each run, in milliseconds
        #[arg(long, env = "SIEVE_TIMEOUT_MS")]
        timeout_ms: Option<u64>,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Structured logging: LOG_FORMAT=json for log shipping, human-readable otherwise.
    // Logs always go to stderr; stdout carries only the report.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    cli::configure_rayon(cli.threads);

    match &cli.command {
        Commands::Run {
            workers,
            limit,
            timeout_ms,
            json,
        } => cli::run_sieve(*workers, *limit, *timeout_ms, *json),
        Commands::Verify {
            limit,
            max_workers,
            timeout_ms,
        } => cli::run_verify(*limit, *max_workers, *timeout_ms),
    }
}

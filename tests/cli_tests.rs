//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;

#[allow(deprecated)]
fn spmd_sieve() -> Command {
    let mut cmd = Command::cargo_bin("spmd-sieve").unwrap();
    cmd.env_remove("SIEVE_TIMEOUT_MS")
        .env_remove("LOG_FORMAT")
        .env("RUST_LOG", "warn");
    cmd
}

// --- Help and arg validation ---

#[test]
fn help_shows_subcommands() {
    spmd_sieve()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run").and(predicate::str::contains("verify")));
}

#[test]
fn help_run_shows_args() {
    spmd_sieve()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("<WORKERS>")
                .and(predicate::str::contains("<LIMIT>"))
                .and(predicate::str::contains("--timeout-ms"))
                .and(predicate::str::contains("--json")),
        );
}

#[test]
fn run_missing_limit_fails() {
    spmd_sieve().args(["run", "4"]).assert().failure();
}

#[test]
fn run_rejects_zero_workers() {
    spmd_sieve()
        .args(["run", "0", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("worker count must be at least 1"));
}

#[test]
fn run_rejects_limit_below_two() {
    spmd_sieve()
        .args(["run", "3", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("upper bound must be at least 2"));
}

// --- Runs ---

#[test]
fn run_thirty_prints_report() {
    spmd_sieve()
        .args(["run", "3", "30"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Finding all primes in the range from 2 to 30 with 3 workers.")
                .and(predicate::str::contains(
                    "The prime numbers are: 2 3 5 7 11 13 17 19 23 29\n",
                ))
                .and(predicate::str::contains("Finished. Exiting")),
        );
}

#[test]
fn run_two_prints_single_prime() {
    spmd_sieve()
        .args(["run", "4", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The prime numbers are: 2\n"));
}

#[test]
fn run_json_output() {
    spmd_sieve()
        .args(["run", "2", "10", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"limit":10,"workers":2,"primes":[2,3,5,7]}"#,
        ));
}

#[test]
fn verify_reports_every_worker_count() {
    spmd_sieve()
        .args(["verify", "--limit", "500", "--max-workers", "4"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("workers=1")
                .and(predicate::str::contains("workers=4"))
                .and(predicate::str::contains("MISMATCH").not()),
        );
}

//! Run configuration, validated before any worker starts.

use std::time::Duration;

use serde::Serialize;

use crate::error::{Result, SieveError};

/// Parameters of one distributed run.
///
/// `workers` is fixed for the whole run; `limit` is the inclusive upper bound
/// n of [2, n]. `recv_timeout` bounds how long the collector waits for any
/// single peer; `None` waits indefinitely.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    workers: usize,
    limit: u64,
    #[serde(skip)]
    recv_timeout: Option<Duration>,
}

impl RunConfig {
    pub fn new(workers: usize, limit: u64) -> Result<Self> {
        if workers == 0 {
            return Err(SieveError::InvalidWorkerCount(workers));
        }
        if limit < 2 {
            return Err(SieveError::InvalidLimit(limit));
        }
        Ok(RunConfig {
            workers,
            limit,
            recv_timeout: None,
        })
    }

    pub fn with_recv_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.recv_timeout = timeout;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn recv_timeout(&self) -> Option<Duration> {
        self.recv_timeout
    }
}

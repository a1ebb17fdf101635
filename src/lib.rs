//! Segmented sieve of Eratosthenes distributed over a fixed SPMD world.
//!
//! Every worker sieves the base region [2, floor(sqrt(n))] on its own, marks
//! its contiguous slice of the remaining range, and sends the marks to the
//! collector (rank 0), which merges everything into one ascending list.

pub mod collector;
pub mod config;
pub mod error;
pub mod partition;
pub mod reference;
pub mod sieve;
pub mod transport;
pub mod verify;
pub mod worker;

pub use collector::ResultSet;
pub use config::RunConfig;
pub use error::{Result, SieveError};
pub use partition::{partition, Segment};
pub use sieve::{BaseSieve, MarkArray};
pub use transport::{ChannelTransport, Rank, Tag, Transport, COLLECTOR_RANK, SEGMENT_TAG};
pub use verify::{cross_check, CrossCheck};
pub use worker::{run, run_worker};

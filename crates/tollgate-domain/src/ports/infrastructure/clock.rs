//! Clock Port
//!
//! Every time-dependent decision (cache expiry, burst windows, recovery
//! timeouts) reads time through this port so tests can drive it.

use std::time::Instant;

/// Source of monotonic and wall-clock time
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Monotonic instant
    fn now(&self) -> Instant;

    /// Milliseconds since the Unix epoch
    fn unix_millis(&self) -> u64;
}

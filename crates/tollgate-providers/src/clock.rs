//! Clock implementations
//!
//! [`SystemClock`] reads real time. [`ManualClock`] only moves when told to,
//! which makes TTL, burst-window and recovery-timeout behavior deterministic
//! under test.

use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tollgate_domain::ports::Clock;

/// Real system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a system clock
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn unix_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64)
    }
}

/// Manually advanced clock
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    origin_unix_millis: u64,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    /// Start at the current system time
    pub fn new() -> Self {
        Self::starting_at(SystemClock.unix_millis())
    }

    /// Start at a fixed wall-clock time
    pub fn starting_at(unix_millis: u64) -> Self {
        Self {
            origin: Instant::now(),
            origin_unix_millis: unix_millis,
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        let mut elapsed = self
            .elapsed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *elapsed += by;
    }

    fn elapsed(&self) -> Duration {
        *self
            .elapsed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn unix_millis(&self) -> u64 {
        self.origin_unix_millis + self.elapsed().as_millis() as u64
    }
}

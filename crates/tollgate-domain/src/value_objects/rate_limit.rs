//! Rate limit value objects

use crate::constants::{
    DEFAULT_BURST_LIMIT, DEFAULT_BURST_WINDOW_SECS, DEFAULT_DAILY_LIMIT, RATE_LIMIT_BURST_PREFIX,
    RATE_LIMIT_DAILY_PREFIX,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Per-provider quota policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    /// Requests admitted per daily window
    pub daily_limit: u64,
    /// Requests admitted per burst window, per operation
    pub burst_limit: u64,
    /// Burst window length in seconds
    pub window_seconds: u64,
}

impl RateLimitPolicy {
    /// Create a policy
    pub fn new(daily_limit: u64, burst_limit: u64, window_seconds: u64) -> Self {
        Self {
            daily_limit,
            burst_limit,
            window_seconds,
        }
    }

    /// Policy applied to providers without explicit configuration
    pub fn conservative() -> Self {
        Self::new(
            DEFAULT_DAILY_LIMIT,
            DEFAULT_BURST_LIMIT,
            DEFAULT_BURST_WINDOW_SECS,
        )
    }

    /// Burst window as a duration
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::conservative()
    }
}

/// Which quota denied a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitScope {
    /// Daily quota
    Daily,
    /// Short-window burst quota
    Burst,
}

impl RateLimitScope {
    /// Label value for metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Burst => "burst",
        }
    }
}

impl fmt::Display for RateLimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Daily counter key for a provider
pub fn daily_key(provider: &str) -> String {
    format!("{RATE_LIMIT_DAILY_PREFIX}:{provider}")
}

/// Burst window key for a provider operation
pub fn burst_key(provider: &str, operation: &str) -> String {
    format!("{RATE_LIMIT_BURST_PREFIX}:{provider}:{operation}")
}

/// Outcome of one atomic check against the shared store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreDecision {
    /// Whether the request was admitted (and counted)
    pub admitted: bool,
    /// Counter value after the check
    pub count: u64,
    /// Time until the counted window frees capacity
    pub retry_after: Duration,
}

impl StoreDecision {
    /// An admitted decision
    pub fn admitted(count: u64) -> Self {
        Self {
            admitted: true,
            count,
            retry_after: Duration::ZERO,
        }
    }

    /// A denied decision
    pub fn denied(count: u64, retry_after: Duration) -> Self {
        Self {
            admitted: false,
            count,
            retry_after,
        }
    }
}

/// Current daily usage snapshot for a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitUsage {
    /// Provider identifier
    pub provider: String,
    /// Requests admitted in the current daily window
    pub daily_used: u64,
    /// Configured daily limit
    pub daily_limit: u64,
    /// Requests left in the current daily window
    pub daily_remaining: u64,
    /// Configured burst limit
    pub burst_limit: u64,
    /// Configured burst window in seconds
    pub window_seconds: u64,
    /// Seconds until the daily window resets, if a window is open
    pub resets_in_secs: Option<u64>,
}

impl RateLimitUsage {
    /// Build a usage snapshot from a policy and the observed daily count
    pub fn from_policy(
        provider: impl Into<String>,
        policy: &RateLimitPolicy,
        daily_used: u64,
        resets_in: Option<Duration>,
    ) -> Self {
        Self {
            provider: provider.into(),
            daily_used,
            daily_limit: policy.daily_limit,
            daily_remaining: policy.daily_limit.saturating_sub(daily_used),
            burst_limit: policy.burst_limit,
            window_seconds: policy.window_seconds,
            resets_in_secs: resets_in.map(|d| d.as_secs()),
        }
    }

    /// Whether the daily quota is used up
    pub fn is_exhausted(&self) -> bool {
        self.daily_used >= self.daily_limit
    }
}

/// A rate-limit denial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDenial {
    /// Quota that denied the call
    pub scope: RateLimitScope,
    /// Time until capacity frees up
    pub retry_after: Duration,
    /// Usage at denial time
    pub usage: RateLimitUsage,
}

/// Result of a rate-limit check
///
/// `Degraded` means the shared store could not be consulted; callers treat it
/// as admitted (fail-open).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Both quotas admitted the call
    Admitted,
    /// A quota denied the call
    Denied(RateLimitDenial),
    /// The store was unavailable; admitted without enforcement
    Degraded {
        /// Why enforcement was skipped
        reason: String,
    },
}

impl Admission {
    /// Whether the call may proceed
    pub fn is_admitted(&self) -> bool {
        !matches!(self, Self::Denied(_))
    }
}

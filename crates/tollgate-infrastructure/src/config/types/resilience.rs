//! Circuit breaker configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tollgate_domain::constants::{
    CIRCUIT_BREAKER_FAILURE_THRESHOLD, CIRCUIT_BREAKER_HALF_OPEN_MAX_CALLS,
    CIRCUIT_BREAKER_RECOVERY_TIMEOUT_SECS, CIRCUIT_BREAKER_SUCCESS_THRESHOLD,
};
use tollgate_domain::value_objects::CircuitBreakerSettings;

/// Circuit breaker configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,

    /// Seconds an open circuit waits after the last failure before a trial call
    pub recovery_timeout_secs: u64,

    /// Consecutive half-open successes that close the circuit
    pub success_threshold: u32,

    /// Trial calls allowed in flight while half-open
    pub half_open_max_calls: u32,
}

impl CircuitBreakerConfig {
    /// Breaker settings described by this configuration
    pub fn settings(&self) -> CircuitBreakerSettings {
        CircuitBreakerSettings {
            failure_threshold: self.failure_threshold,
            recovery_timeout: Duration::from_secs(self.recovery_timeout_secs),
            success_threshold: self.success_threshold,
            half_open_max_calls: self.half_open_max_calls,
        }
    }
}

/// Returns the default thresholds: 5 failures, 60 second recovery,
/// 3 successes, 1 trial call in flight
impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: CIRCUIT_BREAKER_FAILURE_THRESHOLD,
            recovery_timeout_secs: CIRCUIT_BREAKER_RECOVERY_TIMEOUT_SECS,
            success_threshold: CIRCUIT_BREAKER_SUCCESS_THRESHOLD,
            half_open_max_calls: CIRCUIT_BREAKER_HALF_OPEN_MAX_CALLS,
        }
    }
}

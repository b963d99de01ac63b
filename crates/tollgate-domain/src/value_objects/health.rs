//! Provider health value objects

use crate::value_objects::{CircuitState, RateLimitUsage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Health status for a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderHealthStatus {
    /// Circuit closed and quota available
    #[default]
    Healthy,
    /// Circuit half-open or daily quota exhausted
    Degraded,
    /// Circuit open
    Unhealthy,
}

impl ProviderHealthStatus {
    /// Derive a status from breaker state and quota usage
    pub fn derive(state: CircuitState, usage: Option<&RateLimitUsage>) -> Self {
        match state {
            CircuitState::Open => Self::Unhealthy,
            CircuitState::HalfOpen => Self::Degraded,
            CircuitState::Closed if usage.is_some_and(RateLimitUsage::is_exhausted) => {
                Self::Degraded
            }
            CircuitState::Closed => Self::Healthy,
        }
    }
}

impl fmt::Display for ProviderHealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded => write!(f, "degraded"),
            Self::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Health of one provider as seen by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderHealthReport {
    /// Provider identifier
    pub provider: String,
    /// Derived status
    pub status: ProviderHealthStatus,
    /// Breaker state
    pub circuit_state: CircuitState,
    /// Daily quota usage; absent when rate limiting is off or the store is unreachable
    pub rate_limit: Option<RateLimitUsage>,
}

impl ProviderHealthReport {
    /// Build a report, deriving the status
    pub fn new(
        provider: impl Into<String>,
        circuit_state: CircuitState,
        rate_limit: Option<RateLimitUsage>,
    ) -> Self {
        Self {
            provider: provider.into(),
            status: ProviderHealthStatus::derive(circuit_state, rate_limit.as_ref()),
            circuit_state,
            rate_limit,
        }
    }
}

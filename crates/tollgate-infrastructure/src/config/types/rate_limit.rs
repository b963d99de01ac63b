//! Rate limit configuration types

use serde::{Deserialize, Serialize};
use tollgate_domain::value_objects::RateLimitPolicy;

/// Rate limiter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enforce quotas at all
    pub enabled: bool,

    /// Policy for providers missing from the providers table
    pub default_policy: RateLimitPolicy,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_policy: RateLimitPolicy::conservative(),
        }
    }
}

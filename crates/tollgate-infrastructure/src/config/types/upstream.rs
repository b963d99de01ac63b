//! Upstream transport configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tollgate_domain::constants::DEFAULT_REQUEST_TIMEOUT_SECS;

/// Upstream call configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Bound on one network call, in seconds
    pub timeout_secs: u64,

    /// User-Agent header sent to providers
    pub user_agent: String,
}

impl UpstreamConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: format!("tollgate/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

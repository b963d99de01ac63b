//! Error handling types
//!
//! Two families live here:
//!
//! - [`Error`] is the internal fault type. Adapters and infrastructure services
//!   return it; the non-critical subsystems (cache, metrics, rate-limit store)
//!   absorb it at their origin and never let it reach a caller.
//! - [`GatewayError`] is the caller-visible taxonomy returned by the request
//!   orchestrator. Each variant maps to a distinct caller strategy.

use crate::value_objects::{RateLimitScope, RateLimitUsage};
use std::time::Duration;
use thiserror::Error;

/// Result over the internal fault type
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause attached to an [`Error`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Internal fault raised by stores, transports and wiring
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON parsing error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// A request or identifier the gateway cannot act on
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Transport failure before any upstream status was seen
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Shared store unreachable or returned something unexpected
    #[error("Infrastructure error: {message}")]
    Infrastructure {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Metrics error: {message}")]
    Metrics { message: String },
}

fn boxed<E: std::error::Error + Send + Sync + 'static>(source: E) -> Option<BoxError> {
    Some(Box::new(source))
}

impl Error {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    pub fn configuration_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: boxed(source),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    pub fn network_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: boxed(source),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: None,
        }
    }

    pub fn infrastructure_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: boxed(source),
        }
    }

    pub fn metrics(message: impl Into<String>) -> Self {
        Self::Metrics {
            message: message.into(),
        }
    }
}

/// Caller-visible gateway error
///
/// Distinguishes "over quota, don't retry yet", "provider unhealthy, don't
/// retry yet" and "this specific call failed".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// Quota denial by the rate limiter. Never retried by the gateway.
    #[error("Rate limit exceeded for {provider} ({scope} quota), retry after {}s", .retry_after.as_secs())]
    RateLimitExceeded {
        /// Provider whose quota was exhausted
        provider: String,
        /// Which quota denied the call
        scope: RateLimitScope,
        /// Earliest time at which a retry may be admitted
        retry_after: Duration,
        /// Usage snapshot at the time of the denial
        usage: RateLimitUsage,
    },

    /// Circuit breaker denial; the upstream was not contacted.
    #[error("Service unavailable: circuit open for {provider}, retry after {}s", .retry_after.as_secs())]
    CircuitOpen {
        /// Provider whose circuit is open
        provider: String,
        /// Remaining recovery time before a trial call is allowed
        retry_after: Duration,
    },

    /// The upstream call completed with a failure status or raised a transport error.
    #[error("Upstream error from {provider}{}: {message}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Upstream {
        /// Provider that failed
        provider: String,
        /// HTTP status, absent for transport-level failures and timeouts
        status: Option<u16>,
        /// Failure description
        message: String,
    },

    /// Missing or invalid provider configuration. Fatal, never retried.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem
        message: String,
    },
}

impl GatewayError {
    /// Create an upstream error
    pub fn upstream<P: Into<String>, M: Into<String>>(
        provider: P,
        status: Option<u16>,
        message: M,
    ) -> Self {
        Self::Upstream {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Provider the error refers to, if any
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::RateLimitExceeded { provider, .. }
            | Self::CircuitOpen { provider, .. }
            | Self::Upstream { provider, .. } => Some(provider),
            Self::Configuration { .. } => None,
        }
    }

    /// Minimum back-off before the same call can succeed
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimitExceeded { retry_after, .. } | Self::CircuitOpen { retry_after, .. } => {
                Some(*retry_after)
            }
            Self::Upstream { .. } | Self::Configuration { .. } => None,
        }
    }

    /// Whether the caller may retry this call at some point
    ///
    /// Upstream failures with a 4xx status other than 408/429 are the
    /// caller's fault and will not succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimitExceeded { .. } | Self::CircuitOpen { .. } => true,
            Self::Upstream { status, .. } => match status {
                None => true,
                Some(code) => *code >= 500 || *code == 408 || *code == 429,
            },
            Self::Configuration { .. } => false,
        }
    }

    /// Short machine-readable kind, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RateLimitExceeded { .. } => "rate_limited",
            Self::CircuitOpen { .. } => "circuit_open",
            Self::Upstream { .. } => "upstream_error",
            Self::Configuration { .. } => "configuration",
        }
    }
}

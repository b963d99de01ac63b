//! Infrastructure Service Ports

/// Time source
pub mod clock;
/// Usage/cost recorder
pub mod metrics;
/// Rate limiter, circuit breaker and response cache services
pub mod resilience;

pub use clock::Clock;
pub use metrics::{CollectorSummary, UsageRecorder};
pub use resilience::{CircuitBreakerRegistryInterface, RateLimiterInterface, ResponseCacheInterface};

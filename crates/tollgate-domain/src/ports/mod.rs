//! Domain Port Interfaces
//!
//! Ports define the contracts that outer layers implement:
//! - **infrastructure/** - clock, usage recorder, resilience services
//! - **providers/** - cache store, rate-limit store, upstream transport, provider profiles

/// Infrastructure service ports
pub mod infrastructure;
/// External service provider ports
pub mod providers;

pub use infrastructure::{
    CircuitBreakerRegistryInterface, Clock, CollectorSummary, RateLimiterInterface,
    ResponseCacheInterface, UsageRecorder,
};
pub use providers::{
    CacheProvider, CounterSnapshot, ProviderProfile, RateLimitStore, UpstreamTransport,
};

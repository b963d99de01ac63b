//! Resilience services
//!
//! The rate limiter and the circuit breaker registry. Neither depends on the
//! other; the request orchestrator composes them.

pub mod circuit_breaker;
pub mod rate_limiter;
pub mod registry;

pub use circuit_breaker::CircuitBreaker;
pub use rate_limiter::{RateLimitPolicies, RateLimiter};
pub use registry::CircuitBreakerRegistry;

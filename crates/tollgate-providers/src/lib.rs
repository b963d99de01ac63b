//! # Tollgate - Provider Implementations
//!
//! Adapters for the external systems the gateway talks to. Each one
//! implements a port defined in `tollgate-domain`.
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Cache | `CacheProvider` | Moka, Redis, Null, Failing |
//! | Rate limit | `RateLimitStore` | Memory, Redis, Failing |
//! | Upstream | `UpstreamTransport` | Reqwest, Stub |
//! | Time | `Clock` | System, Manual |
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! tollgate-providers = { version = "0.1", default-features = false, features = ["cache-moka"] }
//! ```

pub use tollgate_domain::error::{Error, Result};
pub use tollgate_domain::ports::{CacheProvider, Clock, RateLimitStore, UpstreamTransport};

/// Provider-specific constants
pub mod constants;

/// Cache provider implementations
pub mod cache;

/// Clock implementations
pub mod clock;

/// Upstream transports
pub mod http;

/// Rate-limit store implementations
pub mod rate_limit;

#[cfg(any(feature = "cache-redis", feature = "ratelimit-redis"))]
mod redis_connection;

pub use clock::{ManualClock, SystemClock};

//! External Provider Ports
//!
//! | Port | Description |
//! |------|-------------|
//! | CacheProvider | Store behind the response cache |
//! | RateLimitStore | Shared counters behind the rate limiter |
//! | UpstreamTransport | Network call to a provider |
//! | ProviderProfile | Per-provider address, quotas, TTL and pricing |

/// Cache provider port
pub mod cache;
/// Rate limit store port
pub mod rate_limit;
/// Upstream transport and provider profile ports
pub mod upstream;

pub use cache::CacheProvider;
pub use rate_limit::{CounterSnapshot, RateLimitStore};
pub use upstream::{ProviderProfile, UpstreamTransport};

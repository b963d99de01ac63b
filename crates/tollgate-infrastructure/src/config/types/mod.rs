//! Configuration types module

pub mod app;
pub mod cache;
pub mod logging;
pub mod metrics;
pub mod providers;
pub mod rate_limit;
pub mod resilience;
pub mod store;
pub mod upstream;

pub use app::AppConfig;
pub use cache::CacheConfig;
pub use logging::LoggingConfig;
pub use metrics::MetricsConfig;
pub use providers::ProviderConfig;
pub use rate_limit::RateLimitConfig;
pub use resilience::CircuitBreakerConfig;
pub use store::{StoreBackend, StoreConfig};
pub use upstream::UpstreamConfig;

//! Cache Provider Implementations
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | [`NullCacheProvider`] | Disabled | Stores nothing |
//! | [`MokaCacheProvider`] | Local | In-memory, per-entry TTL, injectable clock |
//! | [`RedisCacheProvider`] | Distributed | Shared across processes |
//! | [`FailingCacheProvider`] | Testing | Every operation fails |

pub mod failing;
#[cfg(feature = "cache-moka")]
pub mod moka;
pub mod null;
#[cfg(feature = "cache-redis")]
pub mod redis;

pub use failing::FailingCacheProvider;
#[cfg(feature = "cache-moka")]
pub use self::moka::MokaCacheProvider;
pub use null::NullCacheProvider;
#[cfg(feature = "cache-redis")]
pub use self::redis::RedisCacheProvider;

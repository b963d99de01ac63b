//! Rate Limit Store Implementations
//!
//! | Store | Type | Description |
//! |-------|------|-------------|
//! | [`MemoryRateLimitStore`] | Local | Single-process counters |
//! | [`RedisRateLimitStore`] | Distributed | Lua-scripted counters shared across processes |
//! | [`FailingRateLimitStore`] | Testing | Every operation fails |

pub mod failing;
pub mod memory;
#[cfg(feature = "ratelimit-redis")]
pub mod redis;

pub use failing::FailingRateLimitStore;
pub use memory::MemoryRateLimitStore;
#[cfg(feature = "ratelimit-redis")]
pub use self::redis::RedisRateLimitStore;

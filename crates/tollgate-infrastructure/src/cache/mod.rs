//! Response cache service

pub mod response_cache;

pub use response_cache::{CacheTtlPolicy, ResponseCache};

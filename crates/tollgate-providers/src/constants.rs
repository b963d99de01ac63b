//! Provider Constants
//!
//! Constants specific to provider implementations. Shared-store key layout
//! and quota defaults live in tollgate-domain.

// ============================================================================
// CACHE PROVIDER CONSTANTS
// ============================================================================

/// Default maximum number of entries held by the in-memory cache
pub const CACHE_DEFAULT_MAX_ENTRIES: u64 = 10_000;

// ============================================================================
// RATE LIMIT STORE CONSTANTS
// ============================================================================

/// Burst windows kept by the in-memory store before idle ones are pruned
pub const RATE_LIMIT_MEMORY_MAX_WINDOWS: usize = 10_000;

/// Default timeout for a single shared-store operation, in milliseconds
pub const STORE_OPERATION_TIMEOUT_MS: u64 = 500;

// ============================================================================
// HTTP CONSTANTS
// ============================================================================

/// Maximum idle connections per host
pub const HTTP_MAX_IDLE_PER_HOST: usize = 10;

/// Idle connection timeout in seconds
pub const HTTP_IDLE_TIMEOUT_SECS: u64 = 90;

/// TCP keep-alive in seconds
pub const HTTP_KEEPALIVE_SECS: u64 = 60;

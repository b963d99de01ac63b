//! Domain constants
//!
//! Shared-store key layout and the defaults every layer agrees on. The key
//! prefixes are an interoperability contract with other processes sharing
//! the same store and must not change.

// ============================================================================
// SHARED-STORE KEY LAYOUT
// ============================================================================

/// Daily counter key prefix: `rate_limit:daily:{provider}`
pub const RATE_LIMIT_DAILY_PREFIX: &str = "rate_limit:daily";

/// Burst window key prefix: `rate_limit:burst:{provider}:{operation}`
pub const RATE_LIMIT_BURST_PREFIX: &str = "rate_limit:burst";

/// Response cache key prefix: `api_cache:{sha256-hex}`
pub const CACHE_KEY_PREFIX: &str = "api_cache";

/// Per-provider cache index prefix: `api_cache:index:{provider}`
pub const CACHE_INDEX_PREFIX: &str = "api_cache:index";

// ============================================================================
// RATE LIMIT DEFAULTS
// ============================================================================

/// Length of the daily quota window in seconds
pub const DAILY_WINDOW_SECS: u64 = 86_400;

/// Conservative daily limit for providers without a configured policy
pub const DEFAULT_DAILY_LIMIT: u64 = 1_000;

/// Conservative burst limit for providers without a configured policy
pub const DEFAULT_BURST_LIMIT: u64 = 5;

/// Default burst window in seconds
pub const DEFAULT_BURST_WINDOW_SECS: u64 = 1;

/// Extra lifetime given to burst keys beyond the window, in milliseconds
pub const BURST_KEY_EXPIRY_SLACK_MS: u64 = 1_000;

// ============================================================================
// CIRCUIT BREAKER DEFAULTS
// ============================================================================

/// Consecutive failures that open the circuit
pub const CIRCUIT_BREAKER_FAILURE_THRESHOLD: u32 = 5;

/// Seconds an open circuit waits before a trial call
pub const CIRCUIT_BREAKER_RECOVERY_TIMEOUT_SECS: u64 = 60;

/// Consecutive half-open successes that close the circuit
pub const CIRCUIT_BREAKER_SUCCESS_THRESHOLD: u32 = 3;

/// Concurrent trial calls admitted while half-open
pub const CIRCUIT_BREAKER_HALF_OPEN_MAX_CALLS: u32 = 1;

// ============================================================================
// CACHE AND UPSTREAM DEFAULTS
// ============================================================================

/// Default cache TTL in seconds for providers without a configured TTL
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3_600;

/// Default upstream request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// First HTTP status treated as an upstream failure
pub const UPSTREAM_FAILURE_STATUS: u16 = 400;

//! Infrastructure constants
//!
//! Configuration, logging and metrics defaults. Quota, breaker and cache
//! defaults shared with other layers live in `tollgate_domain::constants`.

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Environment variable prefix; nested keys are split on `__`
pub const CONFIG_ENV_PREFIX: &str = "TOLLGATE";

/// Separator between nested keys in environment variable names
pub const CONFIG_ENV_SEPARATOR: &str = "__";

/// Configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "tollgate.toml";

/// Configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "tollgate";

// ============================================================================
// LOGGING
// ============================================================================

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV_VAR: &str = "TOLLGATE_LOG";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ============================================================================
// SHARED STORE
// ============================================================================

/// Default Redis URL
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Default timeout for one shared-store operation, in milliseconds
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 500;

// ============================================================================
// METRICS
// ============================================================================

/// Metric name prefix
pub const METRICS_NAMESPACE: &str = "tollgate";

/// Fixed latency histogram buckets, in seconds
pub const LATENCY_BUCKETS: [f64; 12] = [
    0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
];

// ============================================================================
// HEALTH
// ============================================================================

/// Key read to check shared-store reachability
pub const HEALTH_CHECK_KEY: &str = "tollgate:health:check";

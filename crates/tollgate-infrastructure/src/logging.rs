//! Structured logging with tracing
//!
//! Events go to stderr so command output on stdout stays machine-readable.
//! `TOLLGATE_LOG` overrides the configured filter when set.

use crate::config::LoggingConfig;
use crate::constants::LOG_ENV_VAR;
use std::path::Path;
use tollgate_domain::error::{Error, Result};
use tracing::{Level, debug, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber
///
/// Fails on an unknown level or when a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;

    let mut layers: Vec<BoxedLayer> = vec![console_layer(config.json_format)];
    if let Some(path) = &config.file_output {
        layers.push(file_layer(path, config.json_format));
    }

    let filter = log_filter(std::env::var(LOG_ENV_VAR).ok().as_deref(), level);

    Registry::default()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| Error::configuration_with_source("Failed to install tracing subscriber", e))?;

    info!(%level, json = config.json_format, "Logging initialized");
    Ok(())
}

/// `TOLLGATE_LOG` directives when set and valid, else the parsed level
///
/// The configured string is never used as a directive: `warning` would parse
/// as a target name and silence everything else.
fn log_filter(env_directives: Option<&str>, level: Level) -> EnvFilter {
    env_directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level.as_str()))
}

fn console_layer(json: bool) -> BoxedLayer {
    let layer = fmt::layer().with_target(true).with_writer(std::io::stderr);
    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

/// Daily-rolling file next to `path`, never colored
fn file_layer(path: &Path, json: bool) -> BoxedLayer {
    let directory = path.parent().unwrap_or_else(|| Path::new("."));
    let prefix = path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("tollgate.log"));
    let layer = fmt::layer()
        .with_ansi(false)
        .with_writer(tracing_appender::rolling::daily(directory, prefix));
    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

/// Accepts the five tracing levels plus `warning`, in any case
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(Error::configuration(format!(
            "Unknown log level '{other}', expected trace|debug|info|warn|error"
        ))),
    }
}

pub fn log_config_loaded(config_path: &Path, found: bool) {
    if found {
        info!(path = %config_path.display(), "Configuration file loaded");
    } else {
        warn!(path = %config_path.display(), "Configuration file not found, using defaults");
    }
}

pub fn log_health_check(component: &str, healthy: bool, details: Option<&str>) {
    match (healthy, details) {
        (true, _) => debug!(component, "Store reachable"),
        (false, Some(details)) => warn!(component, details, "Store unreachable"),
        (false, None) => warn!(component, "Store unreachable"),
    }
}

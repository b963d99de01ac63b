//! Context helpers for foreign errors
//!
//! Store and file operations fail with `io`, `toml` or `figment` errors; these
//! helpers fold them into the domain [`Error`] with a prefix naming the step.

use std::fmt::Display;
use tollgate_domain::error::{Error, Result};

/// Attach a message to a foreign error while converting it
///
/// ```ignore
/// let raw = std::fs::read_to_string(&path)
///     .config_context(format!("Failed to read {}", path.display()))?;
/// ```
pub trait ErrorContext<T> {
    /// Convert into [`Error::Infrastructure`]
    fn context(self, context: impl Display) -> Result<T>;

    /// Convert into [`Error::Configuration`]
    fn config_context(self, context: impl Display) -> Result<T>;

    /// Convert into [`Error::Network`]
    fn network_context(self, context: impl Display) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Display) -> Result<T> {
        self.map_err(|err| Error::infrastructure_with_source(format!("{context}: {err}"), err))
    }

    fn config_context(self, context: impl Display) -> Result<T> {
        self.map_err(|err| Error::configuration_with_source(format!("{context}: {err}"), err))
    }

    fn network_context(self, context: impl Display) -> Result<T> {
        self.map_err(|err| Error::network_with_source(format!("{context}: {err}"), err))
    }
}

//! Configuration management
//!
//! Figment-based loading of [`AppConfig`] from defaults, a TOML file and
//! `TOLLGATE__`-prefixed environment variables.

pub mod loader;
pub mod types;

pub use loader::{ConfigBuilder, ConfigLoader};
pub use types::*;

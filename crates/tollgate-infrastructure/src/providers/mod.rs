//! Provider profiles
//!
//! [`ConfiguredProvider`] turns one entry of the provider table into a
//! [`ProviderProfile`](tollgate_domain::ports::ProviderProfile). The
//! built-in table supplies defaults that configuration entries override.

pub mod builtin;
pub mod configured;

pub use builtin::builtin_providers;
pub use configured::ConfiguredProvider;

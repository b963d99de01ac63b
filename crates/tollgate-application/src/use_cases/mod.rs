//! Use case implementations

pub mod gateway_service;
pub mod provider_catalog;

pub use gateway_service::GatewayServiceImpl;
pub use provider_catalog::ProviderCatalog;

//! Provider catalog
//!
//! The set of providers the gateway may call, keyed by name.

use std::collections::BTreeMap;
use std::sync::Arc;
use tollgate_domain::ports::ProviderProfile;

/// Registered provider profiles
#[derive(Debug, Clone, Default)]
pub struct ProviderCatalog {
    providers: BTreeMap<String, Arc<dyn ProviderProfile>>,
}

impl ProviderCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a profile, replacing any profile with the same name
    pub fn with_provider(mut self, profile: Arc<dyn ProviderProfile>) -> Self {
        self.register(profile);
        self
    }

    /// Register a profile
    pub fn register(&mut self, profile: Arc<dyn ProviderProfile>) {
        self.providers.insert(profile.name().to_string(), profile);
    }

    /// Look up a profile
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ProviderProfile>> {
        self.providers.get(name)
    }

    /// Provider names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Profiles in name order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ProviderProfile>> {
        self.providers.values()
    }

    /// Number of providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

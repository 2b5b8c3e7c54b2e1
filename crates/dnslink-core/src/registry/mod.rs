//! Plugin-based backend registry
//!
//! The registry lets pinning services, gateways and DNS providers register
//! factories by name, so the binary builds backends from configuration
//! without hard-coded match arms.
//!
//! ## Registration
//!
//! Implementation crates expose a `register()` function:
//!
//! ```rust,ignore
//! // In dnslink-provider-netlify
//! pub fn register(registry: &ProviderRegistry) {
//!     registry.register_dns_provider("netlify", Box::new(NetlifyFactory));
//! }
//! ```

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::config::{DnsProviderConfig, GatewayConfig, PinningConfig};
use crate::error::{Error, Result};
use crate::traits::{
    DnsProvider, DnsProviderFactory, Gateway, GatewayFactory, PinningService,
    PinningServiceFactory,
};

/// Registry of backend factories keyed by type name
///
/// ## Thread Safety
///
/// Interior mutability with RwLock: concurrent reads, exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered DNS provider factories
    dns_providers: RwLock<HashMap<String, Box<dyn DnsProviderFactory>>>,

    /// Registered pinning service factories
    pinning_services: RwLock<HashMap<String, Box<dyn PinningServiceFactory>>>,

    /// Registered gateway factories
    gateways: RwLock<HashMap<String, Box<dyn GatewayFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DNS provider factory under `name` (e.g. "netlify")
    pub fn register_dns_provider(
        &self,
        name: impl Into<String>,
        factory: Box<dyn DnsProviderFactory>,
    ) {
        self.dns_providers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), factory);
    }

    /// Register a pinning service factory under `name` (e.g. "pinata")
    pub fn register_pinning_service(
        &self,
        name: impl Into<String>,
        factory: Box<dyn PinningServiceFactory>,
    ) {
        self.pinning_services
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), factory);
    }

    /// Register a gateway factory under `name` (e.g. "http")
    pub fn register_gateway(&self, name: impl Into<String>, factory: Box<dyn GatewayFactory>) {
        self.gateways
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), factory);
    }

    /// Create a DNS provider from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsProvider>)`: Created provider instance
    /// - `Err(Error)`: If the type is not registered or creation fails
    pub fn create_dns_provider(&self, config: &DnsProviderConfig) -> Result<Box<dyn DnsProvider>> {
        let provider_type = config.type_name();
        let providers = self
            .dns_providers
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let factory = providers.get(provider_type).ok_or_else(|| {
            Error::config(format!("Unknown DNS provider type: {}", provider_type))
        })?;

        factory.create(config)
    }

    /// Create a pinning service from configuration
    pub fn create_pinning_service(
        &self,
        config: &PinningConfig,
    ) -> Result<Box<dyn PinningService>> {
        let service_type = config.type_name();
        let services = self
            .pinning_services
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let factory = services.get(service_type).ok_or_else(|| {
            Error::config(format!("Unknown pinning service type: {}", service_type))
        })?;

        factory.create(config)
    }

    /// Create a gateway from configuration
    pub fn create_gateway(&self, config: &GatewayConfig) -> Result<Box<dyn Gateway>> {
        let gateway_type = config.type_name();
        let gateways = self.gateways.read().unwrap_or_else(PoisonError::into_inner);

        let factory = gateways
            .get(gateway_type)
            .ok_or_else(|| Error::config(format!("Unknown gateway type: {}", gateway_type)))?;

        factory.create(config)
    }

    /// List all registered DNS provider types
    pub fn list_dns_providers(&self) -> Vec<String> {
        self.dns_providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Check if a DNS provider type is registered
    pub fn has_dns_provider(&self, name: &str) -> bool {
        self.dns_providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Check if a pinning service type is registered
    pub fn has_pinning_service(&self, name: &str) -> bool {
        self.pinning_services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Check if a gateway type is registered
    pub fn has_gateway(&self, name: &str) -> bool {
        self.gateways
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockProviderFactory;

    impl DnsProviderFactory for MockProviderFactory {
        fn create(&self, _config: &DnsProviderConfig) -> Result<Box<dyn DnsProvider>> {
            Err(Error::Other("Mock provider not implemented".to_string()))
        }
    }

    #[test]
    fn test_registry_registration() {
        let registry = ProviderRegistry::new();

        assert!(!registry.has_dns_provider("mock"));

        registry.register_dns_provider("mock", Box::new(MockProviderFactory));

        assert!(registry.has_dns_provider("mock"));
        assert!(registry.list_dns_providers().contains(&"mock".to_string()));
        assert!(!registry.has_pinning_service("mock"));
        assert!(!registry.has_gateway("mock"));
    }

    #[test]
    fn unknown_type_is_config_error() {
        let registry = ProviderRegistry::new();
        let config = DnsProviderConfig::Netlify {
            api_token: "token".to_string(),
        };
        assert!(matches!(
            registry.create_dns_provider(&config),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            registry.create_gateway(&GatewayConfig::default()),
            Err(Error::Config(_))
        ));
    }
}

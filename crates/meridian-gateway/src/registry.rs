//! Authentication provider lookup by type.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{AuthError, AuthResult};
use crate::jwt::{JwtAuthenticationProvider, JWT_TYPE};
use crate::provider::GatewayAuthenticationProvider;

type ProviderFactory = Box<dyn Fn() -> Box<dyn GatewayAuthenticationProvider> + Send + Sync>;

/// Maps provider types to factories producing uninitialised providers.
#[derive(Default)]
pub struct AuthenticationProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl AuthenticationProviderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the `jwt` provider registered.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(JWT_TYPE, || Box::new(JwtAuthenticationProvider::new()));
        registry
    }

    /// Register a provider factory. The last registration for a type wins.
    pub fn register<F>(&mut self, provider_type: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn GatewayAuthenticationProvider> + Send + Sync + 'static,
    {
        let provider_type = provider_type.into();
        if self
            .factories
            .insert(provider_type.clone(), Box::new(factory))
            .is_some()
        {
            debug!(provider_type = %provider_type, "replaced authentication provider");
        }
    }

    /// Construct and initialise the provider registered for `provider_type`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProvider` for an unregistered type, or the provider's
    /// own error when its configuration is rejected.
    pub fn load(
        &self,
        provider_type: &str,
        configuration: &Map<String, Value>,
    ) -> AuthResult<Arc<dyn GatewayAuthenticationProvider>> {
        let factory = self
            .factories
            .get(provider_type)
            .ok_or_else(|| AuthError::UnknownProvider(provider_type.to_owned()))?;

        let mut provider = factory();
        provider.initialize(configuration)?;
        debug!(provider_type, "loaded authentication provider");
        Ok(Arc::from(provider))
    }

    /// Registered provider types, sorted.
    #[must_use]
    pub fn provider_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl std::fmt::Debug for AuthenticationProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationProviderRegistry")
            .field("provider_types", &self.provider_types())
            .finish()
    }
}

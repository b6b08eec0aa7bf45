//! Agent provider and asset manager registry.

use std::sync::Arc;

use super::TypeRegistry;
use crate::agent::{AgentNodeProvider, GenericAgentProvider};
use crate::asset::AssetManager;
use crate::error::RuntimeResult;

/// Maps agent types to providers and asset types to asset managers.
pub struct PluginsRegistry {
    agents: TypeRegistry<Arc<dyn AgentNodeProvider>>,
    assets: TypeRegistry<Arc<dyn AssetManager>>,
}

impl Default for PluginsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginsRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            agents: TypeRegistry::new("agent type"),
            assets: TypeRegistry::new("asset type"),
        }
    }

    /// Create a registry with the built-in agent types registered.
    #[must_use]
    pub fn with_builtin_agents() -> Self {
        let mut registry = Self::new();
        for (agent_type, provider) in GenericAgentProvider::builtins() {
            registry.register_agent(agent_type, provider);
        }
        registry
    }

    /// Register an agent provider. The last registration for a type wins.
    pub fn register_agent(
        &mut self,
        agent_type: impl Into<String>,
        provider: impl AgentNodeProvider + 'static,
    ) {
        self.agents.register(agent_type, Arc::new(provider));
    }

    /// Register an asset manager. The last registration for a type wins.
    pub fn register_asset_manager(
        &mut self,
        asset_type: impl Into<String>,
        manager: Arc<dyn AssetManager>,
    ) {
        self.assets.register(asset_type, manager);
    }

    /// Resolve the provider for an agent type.
    pub fn agent_provider(&self, agent_type: &str) -> RuntimeResult<Arc<dyn AgentNodeProvider>> {
        self.agents.get(agent_type).map(Arc::clone)
    }

    /// Resolve the manager for an asset type.
    pub fn asset_manager(&self, asset_type: &str) -> RuntimeResult<Arc<dyn AssetManager>> {
        self.assets.get(asset_type).map(Arc::clone)
    }

    /// Registered agent types.
    #[must_use]
    pub fn agent_types(&self) -> Vec<&str> {
        self.agents.kinds()
    }

    /// Registered asset types.
    #[must_use]
    pub fn asset_types(&self) -> Vec<&str> {
        self.assets.kinds()
    }
}

impl std::fmt::Debug for PluginsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginsRegistry")
            .field("agents", &self.agents)
            .field("assets", &self.assets)
            .finish()
    }
}

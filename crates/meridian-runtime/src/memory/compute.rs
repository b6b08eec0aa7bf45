//! In-memory compute cluster.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use super::MEMORY_KIND;
use crate::cluster::ComputeClusterRuntime;
use crate::error::{BackendError, BackendResult, RuntimeError, RuntimeResult};
use crate::pod::PodAgentConfiguration;

/// Cluster configuration key prefixed to tenant names to form namespaces.
pub const NAMESPACE_PREFIX_KEY: &str = "namespace-prefix";

/// Submitted pods, keyed by namespace then agent id.
#[derive(Debug, Default)]
pub struct MemoryPodStore {
    namespaces: RwLock<BTreeMap<String, IndexMap<String, PodAgentConfiguration>>>,
}

impl MemoryPodStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pods in a namespace, in submission order.
    pub fn pods(&self, namespace: &str) -> BackendResult<Vec<PodAgentConfiguration>> {
        let namespaces = self
            .namespaces
            .read()
            .map_err(|_| BackendError::other("lock poisoned"))?;

        Ok(namespaces
            .get(namespace)
            .map(|pods| pods.values().cloned().collect())
            .unwrap_or_default())
    }

    fn insert(&self, namespace: String, pod: PodAgentConfiguration) -> BackendResult<()> {
        let mut namespaces = self
            .namespaces
            .write()
            .map_err(|_| BackendError::other("lock poisoned"))?;

        namespaces
            .entry(namespace)
            .or_default()
            .insert(pod.agent_id().to_owned(), pod);
        Ok(())
    }

    fn remove(&self, namespace: &str, agent_id: &str) -> BackendResult<()> {
        let mut namespaces = self
            .namespaces
            .write()
            .map_err(|_| BackendError::other("lock poisoned"))?;

        namespaces
            .get_mut(namespace)
            .and_then(|pods| pods.shift_remove(agent_id))
            .map(|_| ())
            .ok_or_else(|| {
                BackendError::NotFound(format!("agent '{agent_id}' in namespace '{namespace}'"))
            })
    }
}

/// Compute runtime recording pods in a shared [`MemoryPodStore`].
#[derive(Debug, Clone)]
pub struct MemoryComputeRuntime {
    store: Arc<MemoryPodStore>,
    namespace_prefix: String,
}

impl MemoryComputeRuntime {
    #[must_use]
    pub fn new(store: Arc<MemoryPodStore>, namespace_prefix: impl Into<String>) -> Self {
        Self {
            store,
            namespace_prefix: namespace_prefix.into(),
        }
    }

    /// Create a runtime from the `memory` cluster configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClusterConfiguration` when `namespace-prefix` is not a
    /// string.
    pub fn from_config(
        store: Arc<MemoryPodStore>,
        configuration: &Map<String, Value>,
    ) -> RuntimeResult<Self> {
        let prefix = match configuration.get(NAMESPACE_PREFIX_KEY) {
            None => "",
            Some(Value::String(prefix)) => prefix.as_str(),
            Some(_) => {
                return Err(RuntimeError::InvalidClusterConfiguration {
                    kind: MEMORY_KIND.to_owned(),
                    reason: format!("'{NAMESPACE_PREFIX_KEY}' must be a string"),
                })
            }
        };
        Ok(Self::new(store, prefix))
    }

    /// Namespace holding a tenant's pods.
    #[must_use]
    pub fn namespace(&self, tenant: &str) -> String {
        format!("{}{tenant}", self.namespace_prefix)
    }

    /// Pods submitted for a tenant.
    pub fn pods(&self, tenant: &str) -> BackendResult<Vec<PodAgentConfiguration>> {
        self.store.pods(&self.namespace(tenant))
    }
}

#[async_trait]
impl ComputeClusterRuntime for MemoryComputeRuntime {
    fn kind(&self) -> &str {
        MEMORY_KIND
    }

    async fn deploy_agent(&self, tenant: &str, pod: &PodAgentConfiguration) -> BackendResult<()> {
        let namespace = self.namespace(tenant);
        debug!(namespace = %namespace, agent_id = %pod.agent_id(), "recording pod");
        self.store.insert(namespace, pod.clone())
    }

    async fn delete_agent(&self, tenant: &str, agent_id: &str) -> BackendResult<()> {
        self.store.remove(&self.namespace(tenant), agent_id)
    }
}

//! In-process cluster backends.
//!
//! The `memory` streaming and compute kinds plus a keyspace/table
//! datastore. They keep all state in shared, lock-protected maps so a
//! deploy and a later delete observe the same cluster.

mod broker;
mod compute;
mod datastore;

pub use broker::{MemoryBroker, MemoryStreamingRuntime, MemoryTopic};
pub use compute::{MemoryComputeRuntime, MemoryPodStore, NAMESPACE_PREFIX_KEY};
pub use datastore::{KeyspaceAssetManager, MemoryDatastore, Row, TableAssetManager};

use std::sync::Arc;

use crate::registry::{ClusterRuntimeRegistry, PluginsRegistry};

/// Cluster kind served by the in-memory runtimes.
pub const MEMORY_KIND: &str = "memory";

/// Asset type of [`KeyspaceAssetManager`].
pub const KEYSPACE_ASSET_TYPE: &str = "memory-keyspace";

/// Asset type of [`TableAssetManager`].
pub const TABLE_ASSET_TYPE: &str = "memory-table";

/// Shared state behind every in-memory backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackends {
    pub broker: Arc<MemoryBroker>,
    pub pods: Arc<MemoryPodStore>,
    pub datastore: Arc<MemoryDatastore>,
}

impl MemoryBackends {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the `memory` cluster kinds and the datastore asset types.
    pub fn register(&self, clusters: &mut ClusterRuntimeRegistry, plugins: &mut PluginsRegistry) {
        let broker = Arc::clone(&self.broker);
        clusters.register_streaming(MEMORY_KIND, move |_| {
            Ok(Arc::new(MemoryStreamingRuntime::new(Arc::clone(&broker))))
        });

        let pods = Arc::clone(&self.pods);
        clusters.register_compute(MEMORY_KIND, move |configuration| {
            Ok(Arc::new(MemoryComputeRuntime::from_config(
                Arc::clone(&pods),
                configuration,
            )?))
        });

        plugins.register_asset_manager(
            KEYSPACE_ASSET_TYPE,
            Arc::new(KeyspaceAssetManager::new(Arc::clone(&self.datastore))),
        );
        plugins.register_asset_manager(
            TABLE_ASSET_TYPE,
            Arc::new(TableAssetManager::new(Arc::clone(&self.datastore))),
        );
    }
}

//! Cluster runtime registry.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use serde_json::{Map, Value};
use tracing::debug;

use super::TypeRegistry;
use crate::cluster::{ComputeClusterRuntime, StreamingClusterRuntime};
use crate::error::RuntimeResult;

static EMPTY_CONFIGURATION: LazyLock<Map<String, Value>> = LazyLock::new(Map::new);

/// Process-wide cluster runtime configuration: cluster kind to settings
/// (endpoints, credentials) handed to that kind's factory.
pub type ClusterRuntimeConfig = BTreeMap<String, Map<String, Value>>;

/// Constructs a streaming cluster runtime from its kind's configuration.
pub type StreamingFactory = Box<
    dyn Fn(&Map<String, Value>) -> RuntimeResult<Arc<dyn StreamingClusterRuntime>> + Send + Sync,
>;

/// Constructs a compute cluster runtime from its kind's configuration.
pub type ComputeFactory = Box<
    dyn Fn(&Map<String, Value>) -> RuntimeResult<Arc<dyn ComputeClusterRuntime>> + Send + Sync,
>;

/// Maps cluster kinds to streaming and compute runtime factories.
pub struct ClusterRuntimeRegistry {
    configuration: ClusterRuntimeConfig,
    streaming: TypeRegistry<StreamingFactory>,
    compute: TypeRegistry<ComputeFactory>,
}

impl ClusterRuntimeRegistry {
    /// Create an empty registry over the given runtime configuration.
    #[must_use]
    pub fn new(configuration: ClusterRuntimeConfig) -> Self {
        Self {
            configuration,
            streaming: TypeRegistry::new("streaming cluster kind"),
            compute: TypeRegistry::new("compute cluster kind"),
        }
    }

    /// Register a streaming runtime factory. Replaces any earlier factory
    /// for the same kind.
    pub fn register_streaming<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&Map<String, Value>) -> RuntimeResult<Arc<dyn StreamingClusterRuntime>>
            + Send
            + Sync
            + 'static,
    {
        self.streaming.register(kind, Box::new(factory));
    }

    /// Register a compute runtime factory. Replaces any earlier factory for
    /// the same kind.
    pub fn register_compute<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&Map<String, Value>) -> RuntimeResult<Arc<dyn ComputeClusterRuntime>>
            + Send
            + Sync
            + 'static,
    {
        self.compute.register(kind, Box::new(factory));
    }

    /// Construct the streaming runtime for `kind`.
    ///
    /// # Errors
    ///
    /// Fails with `UnknownKind` for an unregistered kind, or with whatever
    /// the factory reports for invalid configuration.
    pub fn resolve_streaming(&self, kind: &str) -> RuntimeResult<Arc<dyn StreamingClusterRuntime>> {
        let factory = self.streaming.get(kind)?;
        debug!(kind, "resolving streaming cluster runtime");
        factory(self.configuration_for(kind))
    }

    /// Construct the compute runtime for `kind`.
    ///
    /// # Errors
    ///
    /// Fails with `UnknownKind` for an unregistered kind, or with whatever
    /// the factory reports for invalid configuration.
    pub fn resolve_compute(&self, kind: &str) -> RuntimeResult<Arc<dyn ComputeClusterRuntime>> {
        let factory = self.compute.get(kind)?;
        debug!(kind, "resolving compute cluster runtime");
        factory(self.configuration_for(kind))
    }

    /// The configuration for `kind`, empty when none was supplied.
    #[must_use]
    pub fn configuration_for(&self, kind: &str) -> &Map<String, Value> {
        self.configuration.get(kind).unwrap_or(&EMPTY_CONFIGURATION)
    }

    /// Registered streaming kinds.
    #[must_use]
    pub fn streaming_kinds(&self) -> Vec<&str> {
        self.streaming.kinds()
    }

    /// Registered compute kinds.
    #[must_use]
    pub fn compute_kinds(&self) -> Vec<&str> {
        self.compute.kinds()
    }
}

impl std::fmt::Debug for ClusterRuntimeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterRuntimeRegistry")
            .field("streaming", &self.streaming)
            .field("compute", &self.compute)
            .finish_non_exhaustive()
    }
}

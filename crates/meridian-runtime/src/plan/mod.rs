//! Execution plans.
//!
//! An [`ExecutionPlan`] is the resolved form of an application: every agent,
//! topic and asset is bound to the runtime or manager that will materialise
//! it, so deploying a plan needs no further registry lookups.

mod builder;

pub use builder::PlanBuilder;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use meridian_model::{ClusterSpec, Connection};

use crate::agent::AgentImplementation;
use crate::asset::AssetImplementation;
use crate::cluster::{ComputeClusterRuntime, ConnectionImplementation, StreamingClusterRuntime};

/// Resolved, immutable deployment graph of one application.
pub struct ExecutionPlan {
    application_id: String,
    streaming_cluster: ClusterSpec,
    compute_cluster: ClusterSpec,
    streaming_runtime: Arc<dyn StreamingClusterRuntime>,
    compute_runtime: Arc<dyn ComputeClusterRuntime>,
    topics: IndexMap<String, Arc<dyn ConnectionImplementation>>,
    agents: IndexMap<String, AgentImplementation>,
    assets: Vec<AssetImplementation>,
}

impl ExecutionPlan {
    #[must_use]
    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// Streaming cluster declared by the application.
    #[must_use]
    pub fn streaming_cluster(&self) -> &ClusterSpec {
        &self.streaming_cluster
    }

    /// Compute cluster declared by the application.
    #[must_use]
    pub fn compute_cluster(&self) -> &ClusterSpec {
        &self.compute_cluster
    }

    #[must_use]
    pub fn streaming_runtime(&self) -> &Arc<dyn StreamingClusterRuntime> {
        &self.streaming_runtime
    }

    #[must_use]
    pub fn compute_runtime(&self) -> &Arc<dyn ComputeClusterRuntime> {
        &self.compute_runtime
    }

    /// Topics keyed by name, in declaration order.
    #[must_use]
    pub fn topics(&self) -> &IndexMap<String, Arc<dyn ConnectionImplementation>> {
        &self.topics
    }

    /// Agents keyed by id, in pipeline order.
    #[must_use]
    pub fn agents(&self) -> &IndexMap<String, AgentImplementation> {
        &self.agents
    }

    #[must_use]
    pub fn agent(&self, id: &str) -> Option<&AgentImplementation> {
        self.agents.get(id)
    }

    /// Assets in declaration order.
    #[must_use]
    pub fn assets(&self) -> &[AssetImplementation] {
        &self.assets
    }

    /// Resolve a connection to its cluster-specific handle.
    #[must_use]
    pub fn connection_implementation(
        &self,
        connection: &Connection,
    ) -> Option<&Arc<dyn ConnectionImplementation>> {
        self.topics.get(&connection.topic)
    }
}

impl fmt::Debug for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionPlan")
            .field("application_id", &self.application_id)
            .field("streaming_cluster", &self.streaming_cluster.kind)
            .field("compute_cluster", &self.compute_cluster.kind)
            .field("topics", &self.topics.keys().collect::<Vec<_>>())
            .field("agents", &self.agents.keys().collect::<Vec<_>>())
            .field(
                "assets",
                &self.assets.iter().map(AssetImplementation::name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

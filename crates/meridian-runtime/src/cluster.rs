//! Streaming and compute cluster runtime contracts.
//!
//! A streaming runtime turns topic declarations into
//! [`ConnectionImplementation`]s during plan building and materialises them
//! during deploy. A compute runtime receives one [`PodAgentConfiguration`]
//! per agent. Both are resolved by cluster kind through
//! [`ClusterRuntimeRegistry`](crate::registry::ClusterRuntimeRegistry).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use meridian_model::{CreationMode, TopicDefinition};

use crate::error::{BackendResult, RuntimeResult};
use crate::pod::{PodAgentConfiguration, TopicBinding};

/// Cluster-specific handle for a resolved topic.
///
/// Each streaming runtime returns its own concrete type; callers that need
/// runtime-specific detail downcast through [`as_any`](Self::as_any).
pub trait ConnectionImplementation: fmt::Debug + Send + Sync {
    /// Physical topic name.
    fn topic_name(&self) -> &str;

    /// Creation policy bound at plan-build time.
    fn creation_mode(&self) -> CreationMode;

    /// Access the concrete type.
    fn as_any(&self) -> &dyn Any;
}

impl dyn ConnectionImplementation + '_ {
    /// Downcast to a concrete connection type.
    #[must_use]
    pub fn downcast_ref<T: ConnectionImplementation + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Streaming layer carrying the topics between agents.
#[async_trait]
pub trait StreamingClusterRuntime: Send + Sync {
    /// Cluster kind this runtime serves.
    fn kind(&self) -> &str;

    /// Resolve a topic declaration. Pure: must not touch the cluster.
    fn create_topic_implementation(
        &self,
        topic: &TopicDefinition,
    ) -> RuntimeResult<Arc<dyn ConnectionImplementation>>;

    /// Describe how an agent binds to a topic in its pod configuration.
    fn topic_binding(&self, connection: &dyn ConnectionImplementation) -> TopicBinding;

    /// Whether the topic exists for the tenant.
    async fn topic_exists(
        &self,
        tenant: &str,
        connection: &dyn ConnectionImplementation,
    ) -> BackendResult<bool>;

    /// Create the topic. Fails with `AlreadyExists` if it is present.
    async fn create_topic(
        &self,
        tenant: &str,
        connection: &dyn ConnectionImplementation,
    ) -> BackendResult<()>;
}

/// Compute layer running agent pods.
#[async_trait]
pub trait ComputeClusterRuntime: Send + Sync {
    /// Cluster kind this runtime serves.
    fn kind(&self) -> &str;

    /// Submit (or replace) the deployment for one agent.
    async fn deploy_agent(&self, tenant: &str, pod: &PodAgentConfiguration) -> BackendResult<()>;

    /// Remove the deployment for one agent. Fails with `NotFound` if absent.
    async fn delete_agent(&self, tenant: &str, agent_id: &str) -> BackendResult<()>;
}

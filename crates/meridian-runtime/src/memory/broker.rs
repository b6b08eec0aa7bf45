//! In-memory streaming cluster.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use meridian_model::{CreationMode, TopicDefinition};
use serde_json::{Map, Value};

use super::MEMORY_KIND;
use crate::cluster::{ConnectionImplementation, StreamingClusterRuntime};
use crate::error::{BackendError, BackendResult, RuntimeError, RuntimeResult};
use crate::pod::TopicBinding;

/// Tenant-scoped topics holding JSON records.
#[derive(Debug, Default)]
pub struct MemoryBroker {
    topics: RwLock<BTreeMap<(String, String), Vec<Value>>>,
}

impl MemoryBroker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a topic. Fails with `AlreadyExists` if it is present.
    pub fn create_topic(&self, tenant: &str, topic: &str) -> BackendResult<()> {
        let mut topics = self
            .topics
            .write()
            .map_err(|_| BackendError::other("lock poisoned"))?;

        let key = (tenant.to_owned(), topic.to_owned());
        if topics.contains_key(&key) {
            return Err(BackendError::AlreadyExists(format!("topic '{topic}'")));
        }
        topics.insert(key, Vec::new());
        Ok(())
    }

    pub fn contains(&self, tenant: &str, topic: &str) -> BackendResult<bool> {
        let topics = self
            .topics
            .read()
            .map_err(|_| BackendError::other("lock poisoned"))?;
        Ok(topics.contains_key(&(tenant.to_owned(), topic.to_owned())))
    }

    /// Append a record to a topic.
    pub fn publish(&self, tenant: &str, topic: &str, record: Value) -> BackendResult<()> {
        let mut topics = self
            .topics
            .write()
            .map_err(|_| BackendError::other("lock poisoned"))?;

        topics
            .get_mut(&(tenant.to_owned(), topic.to_owned()))
            .ok_or_else(|| BackendError::NotFound(format!("topic '{topic}'")))?
            .push(record);
        Ok(())
    }

    /// All records published to a topic, oldest first.
    pub fn records(&self, tenant: &str, topic: &str) -> BackendResult<Vec<Value>> {
        let topics = self
            .topics
            .read()
            .map_err(|_| BackendError::other("lock poisoned"))?;

        topics
            .get(&(tenant.to_owned(), topic.to_owned()))
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("topic '{topic}'")))
    }

    /// Topic names for a tenant, sorted.
    pub fn topics(&self, tenant: &str) -> BackendResult<Vec<String>> {
        let topics = self
            .topics
            .read()
            .map_err(|_| BackendError::other("lock poisoned"))?;

        Ok(topics
            .keys()
            .filter(|(t, _)| t == tenant)
            .map(|(_, name)| name.clone())
            .collect())
    }
}

/// Connection implementation of the `memory` streaming kind.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryTopic {
    pub name: String,
    pub creation_mode: CreationMode,
    pub partitions: u32,
    pub options: Map<String, Value>,
}

impl ConnectionImplementation for MemoryTopic {
    fn topic_name(&self) -> &str {
        &self.name
    }

    fn creation_mode(&self) -> CreationMode {
        self.creation_mode
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Streaming runtime over a shared [`MemoryBroker`].
#[derive(Debug, Clone)]
pub struct MemoryStreamingRuntime {
    broker: Arc<MemoryBroker>,
}

impl MemoryStreamingRuntime {
    #[must_use]
    pub fn new(broker: Arc<MemoryBroker>) -> Self {
        Self { broker }
    }

    fn memory_topic(connection: &dyn ConnectionImplementation) -> BackendResult<&MemoryTopic> {
        connection.downcast_ref::<MemoryTopic>().ok_or_else(|| {
            BackendError::other(format!(
                "topic '{}' was not resolved by the memory runtime",
                connection.topic_name()
            ))
        })
    }
}

#[async_trait]
impl StreamingClusterRuntime for MemoryStreamingRuntime {
    fn kind(&self) -> &str {
        MEMORY_KIND
    }

    fn create_topic_implementation(
        &self,
        topic: &TopicDefinition,
    ) -> RuntimeResult<Arc<dyn ConnectionImplementation>> {
        let partitions = topic.partitions.unwrap_or(1);
        if partitions == 0 {
            return Err(RuntimeError::InvalidClusterConfiguration {
                kind: MEMORY_KIND.to_owned(),
                reason: format!("topic '{}' must have at least one partition", topic.name),
            });
        }
        Ok(Arc::new(MemoryTopic {
            name: topic.name.clone(),
            creation_mode: topic.creation_mode,
            partitions,
            options: topic.options.clone(),
        }))
    }

    fn topic_binding(&self, connection: &dyn ConnectionImplementation) -> TopicBinding {
        let mut binding = TopicBinding::new(connection.topic_name());
        if let Some(topic) = connection.downcast_ref::<MemoryTopic>() {
            binding.options.clone_from(&topic.options);
        }
        binding
    }

    async fn topic_exists(
        &self,
        tenant: &str,
        connection: &dyn ConnectionImplementation,
    ) -> BackendResult<bool> {
        let topic = Self::memory_topic(connection)?;
        self.broker.contains(tenant, &topic.name)
    }

    async fn create_topic(
        &self,
        tenant: &str,
        connection: &dyn ConnectionImplementation,
    ) -> BackendResult<()> {
        let topic = Self::memory_topic(connection)?;
        tracing::debug!(tenant, topic = %topic.name, partitions = topic.partitions, "creating memory topic");
        self.broker.create_topic(tenant, &topic.name)
    }
}

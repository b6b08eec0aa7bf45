//! Per-agent deployment units.
//!
//! [`PodAgentConfiguration`] is what the deployer submits to a compute
//! runtime. [`RuntimePodConfiguration`] is the document the external agent
//! process reads at start-up.

use meridian_model::ClusterSpec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::agent::ComponentType;

/// How an agent reads from or writes to a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicBinding {
    /// Physical topic name.
    pub topic: String,
    /// Runtime-specific binding options.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
}

impl TopicBinding {
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            options: Map::new(),
        }
    }
}

/// Identity and configuration of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSpec {
    pub component_type: ComponentType,
    pub tenant: String,
    pub agent_id: String,
    pub application_id: String,
    pub agent_type: String,
    /// Configuration with secrets rendered.
    pub configuration: Map<String, Value>,
}

/// Deployment unit submitted to the compute runtime for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodAgentConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<TopicBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<TopicBinding>,
    pub agent: AgentSpec,
    /// Streaming cluster the agent connects to.
    pub streaming_cluster: ClusterSpec,
}

impl PodAgentConfiguration {
    #[must_use]
    pub fn agent_id(&self) -> &str {
        &self.agent.agent_id
    }

    /// Produce the document consumed by the agent process.
    #[must_use]
    pub fn into_runtime(self, code_storage: CodeStorageConfig) -> RuntimePodConfiguration {
        RuntimePodConfiguration {
            input: self.input,
            output: self.output,
            agent_spec: self.agent,
            streaming_cluster_config: self.streaming_cluster,
            code_storage_config: code_storage,
        }
    }
}

/// Where the agent process fetches custom code from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeStorageConfig {
    /// Storage kind; `none` when agents only use built-in code.
    #[serde(rename = "type")]
    pub storage_type: String,
    /// Archive holding the application's code.
    #[serde(
        rename = "codeStorageArchiveId",
        alias = "archive_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub archive_id: Option<String>,
    #[serde(default)]
    pub configuration: Map<String, Value>,
}

impl CodeStorageConfig {
    /// No code storage.
    #[must_use]
    pub fn none() -> Self {
        Self {
            storage_type: "none".to_owned(),
            archive_id: None,
            configuration: Map::new(),
        }
    }
}

impl Default for CodeStorageConfig {
    fn default() -> Self {
        Self::none()
    }
}

/// Start-up document for one agent process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimePodConfiguration {
    #[serde(default)]
    pub input: Option<TopicBinding>,
    #[serde(default)]
    pub output: Option<TopicBinding>,
    pub agent_spec: AgentSpec,
    pub streaming_cluster_config: ClusterSpec,
    pub code_storage_config: CodeStorageConfig,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn pod() -> PodAgentConfiguration {
        PodAgentConfiguration {
            input: Some(TopicBinding::new("input-topic")),
            output: None,
            agent: AgentSpec {
                component_type: ComponentType::Processor,
                tenant: "t1".to_owned(),
                agent_id: "app-step1".to_owned(),
                application_id: "app".to_owned(),
                agent_type: "compute".to_owned(),
                configuration: Map::new(),
            },
            streaming_cluster: ClusterSpec::new("memory"),
        }
    }

    #[test]
    fn runtime_configuration_schema() {
        let runtime = pod().into_runtime(CodeStorageConfig::none());
        let json = serde_json::to_value(&runtime).unwrap();

        assert_eq!(
            json,
            json!({
                "input": {"topic": "input-topic"},
                "output": null,
                "agentSpec": {
                    "componentType": "PROCESSOR",
                    "tenant": "t1",
                    "agentId": "app-step1",
                    "applicationId": "app",
                    "agentType": "compute",
                    "configuration": {}
                },
                "streamingClusterConfig": {"type": "memory", "configuration": {}},
                "codeStorageConfig": {"type": "none", "configuration": {}}
            })
        );
    }

    #[test]
    fn code_storage_accepts_archive_alias() {
        let config: CodeStorageConfig =
            serde_json::from_value(json!({"type": "s3", "archive_id": "arc-1"})).unwrap();
        assert_eq!(config.archive_id.as_deref(), Some("arc-1"));

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["codeStorageArchiveId"], "arc-1");
    }
}

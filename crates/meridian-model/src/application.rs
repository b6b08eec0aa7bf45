//! Application aggregate and instance configuration.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::pipeline::{AgentConfiguration, AssetDefinition, TopicDefinition};

/// Module id used when a declaration does not name its module.
pub const DEFAULT_MODULE: &str = "default";

fn default_module_id() -> String {
    DEFAULT_MODULE.to_owned()
}

/// A cluster kind plus the configuration the application hands to it.
///
/// Serialises as `{ "type": ..., "configuration": ... }`, which is also the
/// `streamingClusterConfig` shape consumed by agent runtimes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSpec {
    /// Cluster kind identifier, resolved through the cluster runtime registry.
    #[serde(rename = "type")]
    pub kind: String,
    /// Kind-specific configuration.
    #[serde(default)]
    pub configuration: Map<String, Value>,
}

impl ClusterSpec {
    /// Create a cluster spec with empty configuration.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            configuration: Map::new(),
        }
    }
}

/// Which clusters the application is deployed onto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Instance {
    /// Streaming layer carrying the topics.
    #[serde(alias = "streamingCluster")]
    pub streaming_cluster: ClusterSpec,
    /// Compute layer running the agents.
    #[serde(alias = "computeCluster")]
    pub compute_cluster: ClusterSpec,
}

/// A named external resource, such as a datasource referenced by assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Optional identifier; defaults to the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Resource name used in references.
    pub name: String,
    /// Resource type, e.g. `datasource`.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource configuration (endpoints, credentials placeholders).
    #[serde(default)]
    pub configuration: Map<String, Value>,
}

/// A named pipeline with its topics, assets and ordered steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Module identifier.
    #[serde(default = "default_module_id", alias = "module")]
    pub id: String,
    /// Topic declarations.
    #[serde(default)]
    pub topics: Vec<TopicDefinition>,
    /// Asset declarations, in the order they are materialised.
    #[serde(default)]
    pub assets: Vec<AssetDefinition>,
    /// Ordered pipeline steps.
    #[serde(default)]
    pub pipeline: Vec<AgentConfiguration>,
}

impl Module {
    /// Create an empty module.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            topics: Vec::new(),
            assets: Vec::new(),
            pipeline: Vec::new(),
        }
    }

    /// Find a declared topic by name.
    #[must_use]
    pub fn topic(&self, name: &str) -> Option<&TopicDefinition> {
        self.topics.iter().find(|t| t.name == name)
    }
}

/// Root declarative unit being deployed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// Target clusters.
    pub instance: Instance,
    /// Named resources referenced by assets and agents.
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Modules, each with its own pipeline.
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl Application {
    /// Create an application with no modules.
    #[must_use]
    pub fn new(instance: Instance) -> Self {
        Self {
            instance,
            resources: Vec::new(),
            modules: Vec::new(),
        }
    }

    /// Find a module by id.
    #[must_use]
    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Find a resource by name.
    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name == name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn instance_accepts_camel_case_aliases() {
        let json = r#"{
            "streamingCluster": {"type": "memory"},
            "computeCluster": {"type": "memory", "configuration": {"namespace-prefix": "ns-"}}
        }"#;
        let instance: Instance = serde_json::from_str(json).unwrap();
        assert_eq!(instance.streaming_cluster.kind, "memory");
        assert_eq!(
            instance.compute_cluster.configuration.get("namespace-prefix"),
            Some(&Value::from("ns-"))
        );
    }

    #[test]
    fn module_id_defaults() {
        let module: Module = serde_json::from_str(r#"{"topics":[]}"#).unwrap();
        assert_eq!(module.id, DEFAULT_MODULE);
    }

    #[test]
    fn cluster_spec_serialises_kind_as_type() {
        let json = serde_json::to_value(ClusterSpec::new("memory")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "memory", "configuration": {}}));
    }
}

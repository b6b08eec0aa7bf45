//! Topics, assets and pipeline steps declared by a module.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How the deployer treats a declared resource that may already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CreationMode {
    /// Create the resource only when it is absent.
    CreateIfNotExists,
    /// Create the resource and fail if it already exists.
    Create,
    /// Never create the resource; it is managed elsewhere.
    #[default]
    None,
}

impl CreationMode {
    /// Get the mode name as it appears in pipeline declarations.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateIfNotExists => "create-if-not-exists",
            Self::Create => "create",
            Self::None => "none",
        }
    }
}

impl fmt::Display for CreationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an asset is removed when the application is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeletionMode {
    /// Delete the asset on teardown.
    Delete,
    /// Leave the asset in place.
    #[default]
    None,
}

/// A named stream channel declared by a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TopicDefinition {
    /// Topic name, unique within its module.
    pub name: String,
    /// Creation policy applied at deploy time.
    #[serde(default)]
    pub creation_mode: CreationMode,
    /// Requested partition count, when the streaming cluster supports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partitions: Option<u32>,
    /// Backend-specific topic options.
    #[serde(default, alias = "config", skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
}

impl TopicDefinition {
    /// Create a topic definition with no options.
    #[must_use]
    pub fn new(name: impl Into<String>, creation_mode: CreationMode) -> Self {
        Self {
            name: name.into(),
            creation_mode,
            partitions: None,
            options: Map::new(),
        }
    }
}

/// An external resource managed alongside the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AssetDefinition {
    /// Asset identifier; defaults to the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Asset name, unique within its module.
    pub name: String,
    /// Backend-specific asset type, resolved through the plugins registry.
    pub asset_type: String,
    /// Creation policy applied at deploy time.
    #[serde(default)]
    pub creation_mode: CreationMode,
    /// Deletion policy applied at teardown; absent means leave in place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_mode: Option<DeletionMode>,
    /// Asset configuration handed to the asset manager.
    #[serde(default, alias = "configuration")]
    pub config: Map<String, Value>,
}

impl AssetDefinition {
    /// The asset identifier, falling back to its name.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }

    /// Whether teardown must delete this asset.
    #[must_use]
    pub fn deletes_on_teardown(&self) -> bool {
        self.deletion_mode == Some(DeletionMode::Delete)
    }

    /// Look up a string configuration entry.
    #[must_use]
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(Value::as_str)
    }
}

/// A typed reference from a pipeline step to a topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// The referenced topic name.
    pub topic: String,
}

impl Connection {
    /// Create a connection to the named topic.
    #[must_use]
    pub fn topic(name: impl Into<String>) -> Self {
        Self { topic: name.into() }
    }
}

/// A single pipeline step as declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AgentConfiguration {
    /// Explicit step identifier; derived from position when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Agent type identifier, resolved through the plugins registry.
    #[serde(rename = "type")]
    pub agent_type: String,
    /// Input topic name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// Output topic name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Free-form agent configuration.
    #[serde(default)]
    pub configuration: Map<String, Value>,
}

impl AgentConfiguration {
    /// The input connection, if the step reads from a topic.
    #[must_use]
    pub fn input_connection(&self) -> Option<Connection> {
        self.input.as_deref().map(Connection::topic)
    }

    /// The output connection, if the step writes to a topic.
    #[must_use]
    pub fn output_connection(&self) -> Option<Connection> {
        self.output.as_deref().map(Connection::topic)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn creation_mode_from_kebab_case() {
        let mode: CreationMode = serde_json::from_str(r#""create-if-not-exists""#).unwrap();
        assert_eq!(mode, CreationMode::CreateIfNotExists);
        assert_eq!(mode.to_string(), "create-if-not-exists");
    }

    #[test]
    fn topic_defaults_to_no_creation() {
        let topic: TopicDefinition = serde_json::from_str(r#"{"name":"events"}"#).unwrap();
        assert_eq!(topic.creation_mode, CreationMode::None);
        assert!(topic.options.is_empty());
    }

    #[test]
    fn asset_id_falls_back_to_name() {
        let asset: AssetDefinition = serde_json::from_str(
            r#"{"name":"ks","asset-type":"memory-keyspace","creation-mode":"create"}"#,
        )
        .unwrap();
        assert_eq!(asset.id(), "ks");
        assert!(!asset.deletes_on_teardown());
    }

    #[test]
    fn asset_deletion_mode_is_explicit() {
        let asset: AssetDefinition = serde_json::from_str(
            r#"{"name":"ks","asset-type":"memory-keyspace","deletion-mode":"delete","config":{"keyspace":"vsearch"}}"#,
        )
        .unwrap();
        assert!(asset.deletes_on_teardown());
        assert_eq!(asset.config_str("keyspace"), Some("vsearch"));
    }

    #[test]
    fn agent_connections() {
        let agent: AgentConfiguration = serde_json::from_str(
            r#"{"type":"compute","input":"in","configuration":{"fields":[]}}"#,
        )
        .unwrap();
        assert_eq!(agent.input_connection(), Some(Connection::topic("in")));
        assert_eq!(agent.output_connection(), None);
    }
}

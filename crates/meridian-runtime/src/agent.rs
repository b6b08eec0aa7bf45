//! Agent providers and resolved agent nodes.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cluster::ConnectionImplementation;

/// Role an agent plays in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentType {
    /// Produces records from an external system.
    Source,
    /// Transforms records between topics.
    Processor,
    /// Writes records to an external system.
    Sink,
}

impl ComponentType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "SOURCE",
            Self::Processor => "PROCESSOR",
            Self::Sink => "SINK",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability registered per agent type.
pub trait AgentNodeProvider: Send + Sync {
    /// Component type of agents of this type.
    fn component_type(&self) -> ComponentType;

    /// Check a step configuration, returning the rejection reason.
    fn validate(&self, _configuration: &Map<String, Value>) -> Result<(), String> {
        Ok(())
    }
}

/// Provider that only checks for required configuration keys.
#[derive(Debug, Clone)]
pub struct GenericAgentProvider {
    component_type: ComponentType,
    required: Vec<&'static str>,
}

impl GenericAgentProvider {
    #[must_use]
    pub const fn new(component_type: ComponentType) -> Self {
        Self {
            component_type,
            required: Vec::new(),
        }
    }

    /// Require a configuration key to be present.
    #[must_use]
    pub fn requiring(mut self, key: &'static str) -> Self {
        self.required.push(key);
        self
    }

    /// Built-in agent types.
    #[must_use]
    pub fn builtins() -> Vec<(&'static str, Self)> {
        vec![
            ("source", Self::new(ComponentType::Source)),
            (
                "sink",
                Self::new(ComponentType::Sink).requiring("connector.class"),
            ),
            ("compute", Self::new(ComponentType::Processor)),
            ("query", Self::new(ComponentType::Processor)),
            ("drop", Self::new(ComponentType::Processor)),
            ("vector-db-sink", Self::new(ComponentType::Sink)),
            ("query-vector-db", Self::new(ComponentType::Processor)),
        ]
    }
}

impl AgentNodeProvider for GenericAgentProvider {
    fn component_type(&self) -> ComponentType {
        self.component_type
    }

    fn validate(&self, configuration: &Map<String, Value>) -> Result<(), String> {
        match self
            .required
            .iter()
            .find(|key| !configuration.contains_key(**key))
        {
            Some(key) => Err(format!("missing required configuration entry '{key}'")),
            None => Ok(()),
        }
    }
}

/// A pipeline step bound to its cluster-specific topic handles.
#[derive(Debug, Clone)]
pub struct AgentImplementation {
    /// Globally unique agent id (`<application>-<step>`).
    pub id: String,
    /// Owning module.
    pub module_id: String,
    /// Display name.
    pub name: Option<String>,
    /// Agent type identifier.
    pub agent_type: String,
    /// Component type reported by the provider.
    pub component_type: ComponentType,
    /// Configuration as declared, secrets not yet rendered.
    pub configuration: Map<String, Value>,
    /// Input topic handle.
    pub input: Option<Arc<dyn ConnectionImplementation>>,
    /// Output topic handle.
    pub output: Option<Arc<dyn ConnectionImplementation>>,
}

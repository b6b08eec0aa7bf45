//! Documents handed to the deployer on the command line.

use std::path::Path;

use meridian_model::{loader, Application, Format, ModelResult, Secrets};
use meridian_runtime::ClusterRuntimeConfig;
use serde::Deserialize;

/// The application to deploy, either inline or as a serialized document.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApplicationSource {
    /// A JSON or YAML document held in a string.
    Serialized(String),
    /// An application object embedded directly.
    Inline(Box<Application>),
}

/// Deployer input naming the application, its tenant and its definition.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeDeployerConfiguration {
    /// Application identifier.
    pub name: String,
    pub tenant: String,
    pub application: ApplicationSource,
}

impl RuntimeDeployerConfiguration {
    /// Read a deployer configuration from a JSON or YAML file.
    pub fn load(path: &Path) -> ModelResult<Self> {
        loader::load(path)
    }

    /// The application, parsing it first when it was given as a string.
    pub fn application(&self) -> ModelResult<Application> {
        match &self.application {
            ApplicationSource::Inline(application) => Ok(application.as_ref().clone()),
            ApplicationSource::Serialized(text) => {
                loader::parse_application(text, Format::sniff(text))
            }
        }
    }
}

/// Read the cluster runtime configuration.
pub fn load_cluster_config(path: &Path) -> ModelResult<ClusterRuntimeConfig> {
    loader::load(path)
}

/// Read the secrets bundle, if one was given.
pub fn load_secrets(path: Option<&Path>) -> ModelResult<Option<Secrets>> {
    path.map(loader::load::<Secrets>).transpose()
}

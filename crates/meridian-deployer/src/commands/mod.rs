//! Command implementations.

pub mod delete;
pub mod deploy;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use meridian_model::Secrets;
use meridian_runtime::{
    ApplicationDeployer, ClusterRuntimeRegistry, ExecutionPlan, MemoryBackends, PluginsRegistry,
};
use tracing::info;

use crate::input::{load_cluster_config, load_secrets, RuntimeDeployerConfiguration};

/// Input files shared by `deploy` and `delete`.
#[derive(Debug, Clone, Args)]
pub struct DeploymentArgs {
    /// Cluster runtime configuration (JSON or YAML)
    pub cluster_config: PathBuf,

    /// Deployer configuration naming the application and tenant
    pub app_config: PathBuf,

    /// Secrets bundle
    pub secrets: Option<PathBuf>,
}

/// A compiled plan together with everything needed to apply it.
pub(crate) struct Session {
    pub deployer: ApplicationDeployer,
    pub tenant: String,
    pub plan: ExecutionPlan,
    pub secrets: Option<Secrets>,
}

impl Session {
    /// Load the input files, wire the registries to `backends` and build the
    /// execution plan.
    pub fn open(args: &DeploymentArgs, backends: &MemoryBackends) -> anyhow::Result<Self> {
        let cluster_config = load_cluster_config(&args.cluster_config).with_context(|| {
            format!(
                "loading cluster configuration {}",
                args.cluster_config.display()
            )
        })?;
        let input = RuntimeDeployerConfiguration::load(&args.app_config).with_context(|| {
            format!(
                "loading deployer configuration {}",
                args.app_config.display()
            )
        })?;
        let application = input
            .application()
            .with_context(|| format!("parsing application {}", input.name))?;
        let secrets =
            load_secrets(args.secrets.as_deref()).context("loading secrets bundle")?;

        let mut clusters = ClusterRuntimeRegistry::new(cluster_config);
        let mut plugins = PluginsRegistry::with_builtin_agents();
        backends.register(&mut clusters, &mut plugins);
        let deployer = ApplicationDeployer::new(Arc::new(clusters), Arc::new(plugins));

        let plan = deployer
            .create_implementation(&input.name, &application)
            .with_context(|| format!("building execution plan for {}", input.name))?;
        info!(
            tenant = %input.tenant,
            application = %input.name,
            agents = plan.agents().len(),
            "execution plan ready"
        );

        Ok(Self {
            deployer,
            tenant: input.tenant,
            plan,
            secrets,
        })
    }
}

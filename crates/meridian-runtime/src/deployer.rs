//! Application deployer.
//!
//! Sequences the side effects described by an [`ExecutionPlan`] against the
//! plan's cluster runtimes and asset managers. Every operation runs in
//! order and the first failure aborts the rest: resources created before it
//! stay in place, nothing after it is attempted. Re-running a deploy relies
//! on `create-if-not-exists` creation modes to be safe.

use std::future::Future;
use std::sync::Arc;

use meridian_model::{
    Application, AssetDefinition, ClusterSpec, CreationMode, Resource, Secrets,
};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::agent::AgentImplementation;
use crate::asset::{AssetImplementation, AssetRequest};
use crate::error::{BackendError, BackendResult, Operation, ResourceRef, RuntimeError, RuntimeResult};
use crate::plan::{ExecutionPlan, PlanBuilder};
use crate::pod::{AgentSpec, PodAgentConfiguration};
use crate::registry::{ClusterRuntimeRegistry, PluginsRegistry};

/// An asset declaration with secrets rendered.
struct RenderedAsset<'p> {
    implementation: &'p AssetImplementation,
    definition: AssetDefinition,
    datasource: Option<Resource>,
}

impl RenderedAsset<'_> {
    fn request<'r>(&'r self, tenant: &'r str) -> AssetRequest<'r> {
        AssetRequest {
            tenant,
            asset: &self.definition,
            datasource: self.datasource.as_ref(),
        }
    }

    fn resource(&self) -> ResourceRef {
        ResourceRef::Asset {
            module: self.implementation.module_id.clone(),
            name: self.definition.name.clone(),
            asset_type: self.definition.asset_type.clone(),
        }
    }
}

/// Deploys and tears down execution plans.
#[derive(Debug, Clone)]
pub struct ApplicationDeployer {
    clusters: Arc<ClusterRuntimeRegistry>,
    plugins: Arc<PluginsRegistry>,
}

impl ApplicationDeployer {
    /// Create a deployer over fully populated registries.
    #[must_use]
    pub fn new(clusters: Arc<ClusterRuntimeRegistry>, plugins: Arc<PluginsRegistry>) -> Self {
        Self { clusters, plugins }
    }

    /// Build the execution plan for an application.
    ///
    /// # Errors
    ///
    /// Returns a plan-build error; see [`PlanBuilder::build`].
    pub fn create_implementation(
        &self,
        application_id: &str,
        application: &Application,
    ) -> RuntimeResult<ExecutionPlan> {
        PlanBuilder::new(&self.clusters, &self.plugins).build(application_id, application)
    }

    /// Materialise a plan for a tenant.
    ///
    /// Renders secrets into every agent and asset configuration first, then
    /// creates assets in declaration order, then topics, then submits one
    /// pod per agent. Returns the submitted pod configurations in pipeline
    /// order.
    ///
    /// # Errors
    ///
    /// `MissingSecret` before any side effect; otherwise the first backend
    /// failure, wrapped with tenant, resource and operation.
    pub async fn deploy(
        &self,
        tenant: &str,
        plan: &ExecutionPlan,
        secrets: Option<&Secrets>,
    ) -> RuntimeResult<Vec<PodAgentConfiguration>> {
        let empty = Secrets::new();
        let secrets = secrets.unwrap_or(&empty);

        info!(
            tenant,
            application = %plan.application_id(),
            "deploying application"
        );

        let assets = render_assets(plan.assets().iter(), secrets)?;
        let streaming_cluster = render_cluster(plan.streaming_cluster(), secrets)?;
        let agent_configurations = plan
            .agents()
            .values()
            .map(|agent| secrets.render_map(&agent.configuration))
            .collect::<Result<Vec<_>, _>>()?;

        for asset in &assets {
            let manager = asset.implementation.manager();
            let request = asset.request(tenant);
            apply_creation_mode(
                tenant,
                asset.resource(),
                asset.definition.creation_mode,
                manager.asset_exists(&request),
                manager.deploy_asset(&request),
            )
            .await?;
        }

        let streaming = plan.streaming_runtime();
        for connection in plan.topics().values() {
            apply_creation_mode(
                tenant,
                ResourceRef::Topic {
                    name: connection.topic_name().to_owned(),
                },
                connection.creation_mode(),
                streaming.topic_exists(tenant, connection.as_ref()),
                streaming.create_topic(tenant, connection.as_ref()),
            )
            .await?;
        }

        let mut pods = Vec::with_capacity(plan.agents().len());
        for (agent, configuration) in plan.agents().values().zip(agent_configurations) {
            let pod = pod_configuration(tenant, plan, agent, configuration, &streaming_cluster);
            plan.compute_runtime()
                .deploy_agent(tenant, &pod)
                .await
                .map_err(|e| {
                    RuntimeError::backend(
                        tenant,
                        ResourceRef::Agent {
                            id: agent.id.clone(),
                        },
                        Operation::Submit,
                        e,
                    )
                })?;
            debug!(tenant, agent_id = %agent.id, "submitted agent");
            pods.push(pod);
        }

        info!(
            tenant,
            application = %plan.application_id(),
            agents = pods.len(),
            "application deployed"
        );
        Ok(pods)
    }

    /// Tear down a plan for a tenant.
    ///
    /// Removes every agent deployment, then deletes assets whose deletion
    /// mode is `delete`, in declaration order. Use
    /// [`delete_with_secrets`](Self::delete_with_secrets) when the deleted
    /// assets carry secret placeholders.
    ///
    /// # Errors
    ///
    /// A missing agent or asset is surfaced as `ResourceNotFound`; a
    /// placeholder in a deleted asset's configuration as `MissingSecret`.
    pub async fn delete(&self, tenant: &str, plan: &ExecutionPlan) -> RuntimeResult<()> {
        self.delete_with_secrets(tenant, plan, None).await
    }

    /// Tear down a plan, rendering secrets into the configuration of the
    /// assets being deleted.
    ///
    /// # Errors
    ///
    /// `MissingSecret` before any side effect; otherwise the first backend
    /// failure.
    pub async fn delete_with_secrets(
        &self,
        tenant: &str,
        plan: &ExecutionPlan,
        secrets: Option<&Secrets>,
    ) -> RuntimeResult<()> {
        let empty = Secrets::new();
        let secrets = secrets.unwrap_or(&empty);

        info!(
            tenant,
            application = %plan.application_id(),
            "deleting application"
        );

        let assets = render_assets(
            plan.assets()
                .iter()
                .filter(|asset| asset.definition.deletes_on_teardown()),
            secrets,
        )?;

        for agent in plan.agents().values() {
            plan.compute_runtime()
                .delete_agent(tenant, &agent.id)
                .await
                .map_err(|e| {
                    RuntimeError::backend(
                        tenant,
                        ResourceRef::Agent {
                            id: agent.id.clone(),
                        },
                        Operation::Delete,
                        e,
                    )
                })?;
            debug!(tenant, agent_id = %agent.id, "deleted agent");
        }

        for asset in &assets {
            asset
                .implementation
                .manager()
                .delete_asset(&asset.request(tenant))
                .await
                .map_err(|e| RuntimeError::backend(tenant, asset.resource(), Operation::Delete, e))?;
            info!(tenant, asset = %asset.definition.name, "deleted asset");
        }

        info!(
            tenant,
            application = %plan.application_id(),
            "application deleted"
        );
        Ok(())
    }

    /// Same as [`delete`](Self::delete); used to tear down an ephemeral
    /// deployment after a successful deploy.
    ///
    /// # Errors
    ///
    /// See [`delete`](Self::delete).
    pub async fn cleanup(&self, tenant: &str, plan: &ExecutionPlan) -> RuntimeResult<()> {
        self.delete(tenant, plan).await
    }

    /// Deploy, run `body` with the submitted pods, then tear down.
    ///
    /// Teardown runs whenever the deploy succeeded, whether or not the body
    /// did. When both fail the body's error is returned and the teardown
    /// error is logged.
    ///
    /// # Errors
    ///
    /// The deploy error, the body error, or the teardown error, in that
    /// order of precedence.
    pub async fn deploy_scoped<F, Fut, T, E>(
        &self,
        tenant: &str,
        plan: &ExecutionPlan,
        secrets: Option<&Secrets>,
        body: F,
    ) -> Result<T, E>
    where
        F: FnOnce(Vec<PodAgentConfiguration>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<RuntimeError>,
    {
        let pods = self.deploy(tenant, plan, secrets).await?;
        let outcome = body(pods).await;
        let teardown = self.delete_with_secrets(tenant, plan, secrets).await;

        match (outcome, teardown) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) => Err(err.into()),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(teardown)) => {
                warn!(
                    tenant,
                    application = %plan.application_id(),
                    error = %teardown,
                    "teardown failed after scoped body error"
                );
                Err(err)
            }
        }
    }
}

/// Apply a creation mode given the backend's existence check and create
/// call. Neither future is polled for mode `none`.
async fn apply_creation_mode<X, C>(
    tenant: &str,
    resource: ResourceRef,
    mode: CreationMode,
    exists: X,
    create: C,
) -> RuntimeResult<()>
where
    X: Future<Output = BackendResult<bool>>,
    C: Future<Output = BackendResult<()>>,
{
    if mode == CreationMode::None {
        debug!(tenant, resource = %resource, "creation mode none, skipping");
        return Ok(());
    }

    let present = exists
        .await
        .map_err(|e| RuntimeError::backend(tenant, resource.clone(), Operation::Inspect, e))?;

    match (mode, present) {
        (CreationMode::Create, true) => Err(RuntimeError::ResourceAlreadyExists {
            tenant: tenant.to_owned(),
            resource,
            operation: Operation::Create,
        }),
        (_, true) => {
            debug!(tenant, resource = %resource, "already exists");
            Ok(())
        }
        (_, false) => match create.await {
            Ok(()) => {
                info!(tenant, resource = %resource, "created");
                Ok(())
            }
            Err(BackendError::AlreadyExists(detail))
                if mode == CreationMode::CreateIfNotExists =>
            {
                debug!(tenant, resource = %resource, detail = %detail, "created concurrently");
                Ok(())
            }
            Err(e) => Err(RuntimeError::backend(tenant, resource, Operation::Create, e)),
        },
    }
}

fn render_assets<'p>(
    assets: impl Iterator<Item = &'p AssetImplementation>,
    secrets: &Secrets,
) -> RuntimeResult<Vec<RenderedAsset<'p>>> {
    assets
        .map(|implementation| -> RuntimeResult<RenderedAsset<'p>> {
            let mut definition = implementation.definition.clone();
            definition.config = secrets.render_map(&definition.config)?;
            let datasource = match &implementation.datasource {
                Some(resource) => {
                    let mut resource = resource.clone();
                    resource.configuration = secrets.render_map(&resource.configuration)?;
                    Some(resource)
                }
                None => None,
            };
            Ok(RenderedAsset {
                implementation,
                definition,
                datasource,
            })
        })
        .collect()
}

fn render_cluster(cluster: &ClusterSpec, secrets: &Secrets) -> RuntimeResult<ClusterSpec> {
    Ok(ClusterSpec {
        kind: cluster.kind.clone(),
        configuration: secrets.render_map(&cluster.configuration)?,
    })
}

fn pod_configuration(
    tenant: &str,
    plan: &ExecutionPlan,
    agent: &AgentImplementation,
    configuration: Map<String, Value>,
    streaming_cluster: &ClusterSpec,
) -> PodAgentConfiguration {
    let streaming = plan.streaming_runtime();
    PodAgentConfiguration {
        input: agent.input.as_deref().map(|c| streaming.topic_binding(c)),
        output: agent.output.as_deref().map(|c| streaming.topic_binding(c)),
        agent: AgentSpec {
            component_type: agent.component_type,
            tenant: tenant.to_owned(),
            agent_id: agent.id.clone(),
            application_id: plan.application_id().to_owned(),
            agent_type: agent.agent_type.clone(),
            configuration,
        },
        streaming_cluster: streaming_cluster.clone(),
    }
}

//! Resolution of an application into an [`ExecutionPlan`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;
use meridian_model::{
    AgentConfiguration, Application, Module, TopicDefinition, DEFAULT_MODULE,
};
use tracing::{debug, info};

use super::ExecutionPlan;
use crate::agent::AgentImplementation;
use crate::asset::{AssetImplementation, DATASOURCE_KEY};
use crate::cluster::{ConnectionImplementation, StreamingClusterRuntime};
use crate::error::{RuntimeError, RuntimeResult};
use crate::registry::{ClusterRuntimeRegistry, PluginsRegistry};

type TopicHandle = Arc<dyn ConnectionImplementation>;

/// Builds execution plans from applications.
///
/// Building is synchronous and never calls a cluster: a failed build has
/// no side effects, and a successful one needs no further lookups.
#[derive(Debug, Clone, Copy)]
pub struct PlanBuilder<'a> {
    clusters: &'a ClusterRuntimeRegistry,
    plugins: &'a PluginsRegistry,
}

/// Topics declared so far, shared across modules.
#[derive(Default)]
struct DeclaredTopics<'app> {
    by_name: HashMap<&'app str, (&'app TopicDefinition, TopicHandle)>,
    ordered: IndexMap<String, TopicHandle>,
}

impl<'a> PlanBuilder<'a> {
    #[must_use]
    pub const fn new(clusters: &'a ClusterRuntimeRegistry, plugins: &'a PluginsRegistry) -> Self {
        Self { clusters, plugins }
    }

    /// Resolve `application` into an execution plan.
    ///
    /// # Errors
    ///
    /// Fails with `UnknownKind` for an unregistered cluster kind, agent type
    /// or asset type; `DuplicateIdentifier`, `DanglingTopicReference` or
    /// `DanglingResourceReference` for a malformed graph; and
    /// `InvalidAgentConfiguration` / `InvalidAssetConfiguration` when a
    /// provider rejects a declaration.
    pub fn build(
        &self,
        application_id: &str,
        application: &Application,
    ) -> RuntimeResult<ExecutionPlan> {
        let instance = &application.instance;
        let streaming_runtime = self
            .clusters
            .resolve_streaming(&instance.streaming_cluster.kind)?;
        let compute_runtime = self
            .clusters
            .resolve_compute(&instance.compute_cluster.kind)?;

        let mut topics = DeclaredTopics::default();
        let mut agents = IndexMap::new();
        let mut assets = Vec::new();

        for module in &application.modules {
            debug!(module = %module.id, "resolving module");
            let module_topics = resolve_topics(module, streaming_runtime.as_ref(), &mut topics)?;
            self.resolve_agents(application_id, module, &module_topics, &mut agents)?;
            self.resolve_assets(application, module, &mut assets)?;
        }

        info!(
            application = %application_id,
            topics = topics.ordered.len(),
            agents = agents.len(),
            assets = assets.len(),
            "built execution plan"
        );

        Ok(ExecutionPlan {
            application_id: application_id.to_owned(),
            streaming_cluster: instance.streaming_cluster.clone(),
            compute_cluster: instance.compute_cluster.clone(),
            streaming_runtime,
            compute_runtime,
            topics: topics.ordered,
            agents,
            assets,
        })
    }

    fn resolve_agents(
        &self,
        application_id: &str,
        module: &Module,
        module_topics: &HashMap<&str, TopicHandle>,
        agents: &mut IndexMap<String, AgentImplementation>,
    ) -> RuntimeResult<()> {
        let mut step_ids = HashSet::with_capacity(module.pipeline.len());

        for (position, step) in module.pipeline.iter().enumerate() {
            let step_id = step_id(module, position, step);
            if !step_ids.insert(step_id.clone()) {
                return Err(RuntimeError::duplicate(&module.id, "step", step_id));
            }

            let agent_id = format!("{application_id}-{step_id}");
            if agents.contains_key(&agent_id) {
                return Err(RuntimeError::duplicate(&module.id, "agent", agent_id));
            }

            let provider = self.plugins.agent_provider(&step.agent_type)?;
            let input = bind_topic(module, &agent_id, step.input.as_deref(), module_topics)?;
            let output = bind_topic(module, &agent_id, step.output.as_deref(), module_topics)?;

            provider.validate(&step.configuration).map_err(|reason| {
                RuntimeError::InvalidAgentConfiguration {
                    agent: agent_id.clone(),
                    reason,
                }
            })?;

            debug!(agent_id = %agent_id, agent_type = %step.agent_type, "resolved agent");
            agents.insert(
                agent_id.clone(),
                AgentImplementation {
                    id: agent_id,
                    module_id: module.id.clone(),
                    name: step.name.clone(),
                    agent_type: step.agent_type.clone(),
                    component_type: provider.component_type(),
                    configuration: step.configuration.clone(),
                    input,
                    output,
                },
            );
        }
        Ok(())
    }

    fn resolve_assets(
        &self,
        application: &Application,
        module: &Module,
        assets: &mut Vec<AssetImplementation>,
    ) -> RuntimeResult<()> {
        let mut names = HashSet::with_capacity(module.assets.len());

        for asset in &module.assets {
            if !names.insert(asset.name.as_str()) {
                return Err(RuntimeError::duplicate(&module.id, "asset", &asset.name));
            }

            let manager = self.plugins.asset_manager(&asset.asset_type)?;
            manager
                .validate(asset)
                .map_err(|reason| RuntimeError::InvalidAssetConfiguration {
                    module: module.id.clone(),
                    asset: asset.name.clone(),
                    reason,
                })?;

            let datasource = match asset.config_str(DATASOURCE_KEY) {
                Some(name) => Some(application.resource(name).cloned().ok_or_else(|| {
                    RuntimeError::DanglingResourceReference {
                        module: module.id.clone(),
                        asset: asset.name.clone(),
                        resource: name.to_owned(),
                    }
                })?),
                None => None,
            };

            assets.push(AssetImplementation {
                module_id: module.id.clone(),
                definition: asset.clone(),
                datasource,
                manager,
            });
        }
        Ok(())
    }
}

fn resolve_topics<'app>(
    module: &'app Module,
    runtime: &dyn StreamingClusterRuntime,
    declared: &mut DeclaredTopics<'app>,
) -> RuntimeResult<HashMap<&'app str, TopicHandle>> {
    let mut module_topics = HashMap::with_capacity(module.topics.len());

    for topic in &module.topics {
        if module_topics.contains_key(topic.name.as_str()) {
            return Err(RuntimeError::duplicate(&module.id, "topic", &topic.name));
        }

        let handle = match declared.by_name.get(topic.name.as_str()) {
            Some((existing, handle)) if *existing == topic => Arc::clone(handle),
            Some(_) => return Err(RuntimeError::duplicate(&module.id, "topic", &topic.name)),
            None => {
                let handle = runtime.create_topic_implementation(topic)?;
                declared
                    .by_name
                    .insert(&topic.name, (topic, Arc::clone(&handle)));
                declared
                    .ordered
                    .insert(topic.name.clone(), Arc::clone(&handle));
                handle
            }
        };
        module_topics.insert(topic.name.as_str(), handle);
    }
    Ok(module_topics)
}

fn bind_topic(
    module: &Module,
    agent_id: &str,
    topic: Option<&str>,
    module_topics: &HashMap<&str, TopicHandle>,
) -> RuntimeResult<Option<TopicHandle>> {
    let Some(topic) = topic else {
        return Ok(None);
    };
    module_topics
        .get(topic)
        .map(|handle| Some(Arc::clone(handle)))
        .ok_or_else(|| RuntimeError::DanglingTopicReference {
            module: module.id.clone(),
            agent: agent_id.to_owned(),
            topic: topic.to_owned(),
        })
}

/// Explicit step id, or one derived from the module and 1-based position.
fn step_id(module: &Module, position: usize, step: &AgentConfiguration) -> String {
    if let Some(id) = &step.id {
        return id.clone();
    }
    let index = position + 1;
    if module.id == DEFAULT_MODULE {
        format!("step{index}")
    } else {
        format!("{}-step{index}", module.id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use super::*;

    fn step(id: Option<&str>) -> AgentConfiguration {
        AgentConfiguration {
            id: id.map(ToOwned::to_owned),
            name: None,
            agent_type: "compute".to_owned(),
            input: None,
            output: None,
            configuration: Map::new(),
        }
    }

    #[test]
    fn derived_step_ids() {
        let default = Module::new(DEFAULT_MODULE);
        let named = Module::new("ingest");

        assert_eq!(step_id(&default, 0, &step(None)), "step1");
        assert_eq!(step_id(&named, 2, &step(None)), "ingest-step3");
        assert_eq!(step_id(&named, 0, &step(Some("lookup"))), "lookup");
    }
}

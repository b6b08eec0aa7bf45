//! Common test utilities for runtime integration tests.

#![allow(dead_code, clippy::unwrap_used)]

pub mod fixtures;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use meridian_model::{loader, Application, AssetDefinition, Format};
use meridian_runtime::memory::{KEYSPACE_ASSET_TYPE, TABLE_ASSET_TYPE};
use meridian_runtime::{
    ApplicationDeployer, AssetManager, AssetRequest, BackendError, BackendResult,
    ClusterRuntimeConfig, ClusterRuntimeRegistry, ExecutionPlan, MemoryBackends,
    PluginsRegistry, PodAgentConfiguration,
};

/// Deployer wired to in-memory backends, plus handles on their state.
pub struct TestRuntime {
    pub backends: MemoryBackends,
    pub deployer: ApplicationDeployer,
    pub recorder: Recorder,
    /// Calls reaching the in-memory keyspace and table managers.
    pub datastore_calls: CallLog,
}

impl TestRuntime {
    /// Creates a runtime with no cluster runtime configuration.
    pub fn new() -> Self {
        Self::with_config(ClusterRuntimeConfig::new())
    }

    /// Creates a runtime with the given cluster runtime configuration.
    pub fn with_config(configuration: ClusterRuntimeConfig) -> Self {
        let backends = MemoryBackends::new();
        let recorder = Recorder::default();

        let mut clusters = ClusterRuntimeRegistry::new(configuration);
        let mut plugins = PluginsRegistry::with_builtin_agents();
        backends.register(&mut clusters, &mut plugins);
        plugins.register_asset_manager("recorded", Arc::new(recorder.clone()));

        let datastore_calls = CallLog::default();
        for asset_type in [KEYSPACE_ASSET_TYPE, TABLE_ASSET_TYPE] {
            let inner = plugins.asset_manager(asset_type).unwrap();
            plugins.register_asset_manager(
                asset_type,
                Arc::new(Observed {
                    inner,
                    calls: datastore_calls.clone(),
                }),
            );
        }

        let deployer = ApplicationDeployer::new(Arc::new(clusters), Arc::new(plugins));
        Self {
            backends,
            deployer,
            recorder,
            datastore_calls,
        }
    }

    /// Builds a plan from a YAML application, panicking on failure.
    pub fn plan(&self, application_id: &str, yaml: &str) -> ExecutionPlan {
        self.deployer
            .create_implementation(application_id, &application(yaml))
            .unwrap()
    }

    /// Pods recorded for a tenant in the unprefixed namespace.
    pub fn pods(&self, tenant: &str) -> Vec<PodAgentConfiguration> {
        self.backends.pods.pods(tenant).unwrap()
    }
}

/// Parses a YAML application document.
pub fn application(yaml: &str) -> Application {
    loader::parse_application(yaml, Format::Yaml).unwrap()
}

/// Asset manager that records every call and can be told to fail.
///
/// `fail: create` makes creation fail outright; `fail: already-exists`
/// reports the asset as absent but has creation report it as present.
///
/// Assets are identified by their `key` configuration entry.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<String>>>,
    existing: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn key(request: &AssetRequest<'_>) -> String {
        request
            .asset
            .config_str("key")
            .unwrap_or(&request.asset.name)
            .to_owned()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AssetManager for Recorder {
    async fn asset_exists(&self, request: &AssetRequest<'_>) -> BackendResult<bool> {
        let key = Self::key(request);
        self.record(format!("exists {key}"));
        Ok(self.existing.lock().unwrap().contains(&key))
    }

    async fn deploy_asset(&self, request: &AssetRequest<'_>) -> BackendResult<()> {
        let key = Self::key(request);
        self.record(format!("create {key}"));
        if request.asset.config_str("fail") == Some("create") {
            return Err(BackendError::other("quota exceeded"));
        }
        if request.asset.config_str("fail") == Some("already-exists") {
            return Err(BackendError::AlreadyExists(key));
        }
        self.existing.lock().unwrap().push(key);
        Ok(())
    }

    async fn delete_asset(&self, request: &AssetRequest<'_>) -> BackendResult<()> {
        let key = Self::key(request);
        self.record(format!("delete {key}"));
        let mut existing = self.existing.lock().unwrap();
        match existing.iter().position(|k| *k == key) {
            Some(index) => {
                existing.remove(index);
                Ok(())
            }
            None => Err(BackendError::NotFound(key)),
        }
    }
}

/// Shared, ordered list of `"<operation> <asset name>"` entries.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn push(&self, operation: &str, request: &AssetRequest<'_>) {
        self.0
            .lock()
            .unwrap()
            .push(format!("{operation} {}", request.asset.name));
    }
}

/// Delegates to a real asset manager, logging every side-effecting call.
struct Observed {
    inner: Arc<dyn AssetManager>,
    calls: CallLog,
}

#[async_trait]
impl AssetManager for Observed {
    fn validate(&self, asset: &AssetDefinition) -> Result<(), String> {
        self.inner.validate(asset)
    }

    async fn asset_exists(&self, request: &AssetRequest<'_>) -> BackendResult<bool> {
        self.inner.asset_exists(request).await
    }

    async fn deploy_asset(&self, request: &AssetRequest<'_>) -> BackendResult<()> {
        self.calls.push("create", request);
        self.inner.deploy_asset(request).await
    }

    async fn delete_asset(&self, request: &AssetRequest<'_>) -> BackendResult<()> {
        self.calls.push("delete", request);
        self.inner.delete_asset(request).await
    }
}

//! Asset managers and resolved assets.
//!
//! Assets are materialised in declaration order and deleted in declaration
//! order. No dependency graph is computed between them: a declaration that
//! lists a table before its keyspace fails at deploy time rather than being
//! reordered.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use meridian_model::{AssetDefinition, Resource};

use crate::error::BackendResult;

/// Configuration key naming the resource an asset lives in.
pub const DATASOURCE_KEY: &str = "datasource";

/// An asset with secrets rendered, handed to its manager.
#[derive(Debug, Clone, Copy)]
pub struct AssetRequest<'a> {
    /// Tenant the operation is scoped to.
    pub tenant: &'a str,
    /// Asset declaration.
    pub asset: &'a AssetDefinition,
    /// Resolved datasource, when the asset names one.
    pub datasource: Option<&'a Resource>,
}

/// Capability registered per asset type.
#[async_trait]
pub trait AssetManager: Send + Sync {
    /// Check the asset declaration at plan-build time, returning the
    /// rejection reason.
    fn validate(&self, _asset: &AssetDefinition) -> Result<(), String> {
        Ok(())
    }

    /// Whether the asset exists.
    async fn asset_exists(&self, request: &AssetRequest<'_>) -> BackendResult<bool>;

    /// Create the asset. Fails with `AlreadyExists` if it is present.
    async fn deploy_asset(&self, request: &AssetRequest<'_>) -> BackendResult<()>;

    /// Delete the asset. Fails with `NotFound` if it is absent.
    async fn delete_asset(&self, request: &AssetRequest<'_>) -> BackendResult<()>;
}

/// An asset declaration bound to its manager.
#[derive(Clone)]
pub struct AssetImplementation {
    /// Owning module.
    pub module_id: String,
    /// Declaration, carried unchanged.
    pub definition: AssetDefinition,
    /// Datasource the asset lives in.
    pub datasource: Option<Resource>,
    pub(crate) manager: Arc<dyn AssetManager>,
}

impl AssetImplementation {
    /// The manager responsible for this asset.
    #[must_use]
    pub fn manager(&self) -> &Arc<dyn AssetManager> {
        &self.manager
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }
}

impl fmt::Debug for AssetImplementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetImplementation")
            .field("module_id", &self.module_id)
            .field("definition", &self.definition)
            .field("datasource", &self.datasource.as_ref().map(|r| &r.name))
            .finish_non_exhaustive()
    }
}

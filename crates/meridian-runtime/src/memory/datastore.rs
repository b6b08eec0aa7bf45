//! In-memory keyspace/table datastore and its asset managers.
//!
//! Tables live inside keyspaces, so dropping a keyspace drops its tables.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use meridian_model::AssetDefinition;
use serde_json::{Map, Value};
use tracing::debug;

use crate::asset::{AssetManager, AssetRequest};
use crate::error::{BackendError, BackendResult};

/// Row type stored in tables.
pub type Row = Map<String, Value>;

type Keyspace = BTreeMap<String, Vec<Row>>;

/// Keyspaces holding tables of JSON rows.
#[derive(Debug, Default)]
pub struct MemoryDatastore {
    keyspaces: RwLock<BTreeMap<String, Keyspace>>,
}

fn keyspace_not_found(keyspace: &str) -> BackendError {
    BackendError::NotFound(format!("'{keyspace}' not found in keyspaces"))
}

fn table_not_found(keyspace: &str, table: &str) -> BackendError {
    BackendError::NotFound(format!("table '{table}' not found in keyspace '{keyspace}'"))
}

impl MemoryDatastore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_keyspace(&self, keyspace: &str) -> BackendResult<()> {
        let mut keyspaces = self
            .keyspaces
            .write()
            .map_err(|_| BackendError::other("lock poisoned"))?;

        if keyspaces.contains_key(keyspace) {
            return Err(BackendError::AlreadyExists(format!("keyspace '{keyspace}'")));
        }
        keyspaces.insert(keyspace.to_owned(), Keyspace::new());
        Ok(())
    }

    /// Drop a keyspace together with all of its tables.
    pub fn drop_keyspace(&self, keyspace: &str) -> BackendResult<()> {
        let mut keyspaces = self
            .keyspaces
            .write()
            .map_err(|_| BackendError::other("lock poisoned"))?;

        let dropped = keyspaces
            .remove(keyspace)
            .ok_or_else(|| keyspace_not_found(keyspace))?;
        debug!(keyspace, tables = dropped.len(), "dropped keyspace");
        Ok(())
    }

    pub fn has_keyspace(&self, keyspace: &str) -> BackendResult<bool> {
        let keyspaces = self
            .keyspaces
            .read()
            .map_err(|_| BackendError::other("lock poisoned"))?;
        Ok(keyspaces.contains_key(keyspace))
    }

    pub fn create_table(&self, keyspace: &str, table: &str) -> BackendResult<()> {
        let mut keyspaces = self
            .keyspaces
            .write()
            .map_err(|_| BackendError::other("lock poisoned"))?;

        let tables = keyspaces
            .get_mut(keyspace)
            .ok_or_else(|| keyspace_not_found(keyspace))?;
        if tables.contains_key(table) {
            return Err(BackendError::AlreadyExists(format!(
                "table '{table}' in keyspace '{keyspace}'"
            )));
        }
        tables.insert(table.to_owned(), Vec::new());
        Ok(())
    }

    pub fn drop_table(&self, keyspace: &str, table: &str) -> BackendResult<()> {
        let mut keyspaces = self
            .keyspaces
            .write()
            .map_err(|_| BackendError::other("lock poisoned"))?;

        keyspaces
            .get_mut(keyspace)
            .ok_or_else(|| keyspace_not_found(keyspace))?
            .remove(table)
            .map(|_| ())
            .ok_or_else(|| table_not_found(keyspace, table))
    }

    /// Whether a table exists; `false` when its keyspace is missing.
    pub fn has_table(&self, keyspace: &str, table: &str) -> BackendResult<bool> {
        let keyspaces = self
            .keyspaces
            .read()
            .map_err(|_| BackendError::other("lock poisoned"))?;
        Ok(keyspaces
            .get(keyspace)
            .is_some_and(|tables| tables.contains_key(table)))
    }

    pub fn insert(&self, keyspace: &str, table: &str, row: Row) -> BackendResult<()> {
        let mut keyspaces = self
            .keyspaces
            .write()
            .map_err(|_| BackendError::other("lock poisoned"))?;

        keyspaces
            .get_mut(keyspace)
            .ok_or_else(|| keyspace_not_found(keyspace))?
            .get_mut(table)
            .ok_or_else(|| table_not_found(keyspace, table))?
            .push(row);
        Ok(())
    }

    /// Rows whose fields equal every entry of `filter`.
    pub fn query(&self, keyspace: &str, table: &str, filter: &Row) -> BackendResult<Vec<Row>> {
        let keyspaces = self
            .keyspaces
            .read()
            .map_err(|_| BackendError::other("lock poisoned"))?;

        let rows = keyspaces
            .get(keyspace)
            .ok_or_else(|| keyspace_not_found(keyspace))?
            .get(table)
            .ok_or_else(|| table_not_found(keyspace, table))?;

        Ok(rows
            .iter()
            .filter(|row| filter.iter().all(|(k, v)| row.get(k) == Some(v)))
            .cloned()
            .collect())
    }
}

fn required_str<'a>(asset: &'a AssetDefinition, key: &str) -> Result<&'a str, String> {
    asset
        .config_str(key)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| format!("'{key}' must be a non-empty string"))
}

fn request_str<'a>(request: &'a AssetRequest<'_>, key: &str) -> BackendResult<&'a str> {
    required_str(request.asset, key).map_err(BackendError::other)
}

/// Manages `memory-keyspace` assets (config: `keyspace`).
#[derive(Debug, Clone)]
pub struct KeyspaceAssetManager {
    datastore: Arc<MemoryDatastore>,
}

impl KeyspaceAssetManager {
    #[must_use]
    pub fn new(datastore: Arc<MemoryDatastore>) -> Self {
        Self { datastore }
    }
}

#[async_trait]
impl AssetManager for KeyspaceAssetManager {
    fn validate(&self, asset: &AssetDefinition) -> Result<(), String> {
        required_str(asset, "keyspace").map(|_| ())
    }

    async fn asset_exists(&self, request: &AssetRequest<'_>) -> BackendResult<bool> {
        self.datastore
            .has_keyspace(request_str(request, "keyspace")?)
    }

    async fn deploy_asset(&self, request: &AssetRequest<'_>) -> BackendResult<()> {
        self.datastore
            .create_keyspace(request_str(request, "keyspace")?)
    }

    async fn delete_asset(&self, request: &AssetRequest<'_>) -> BackendResult<()> {
        self.datastore
            .drop_keyspace(request_str(request, "keyspace")?)
    }
}

/// Manages `memory-table` assets (config: `keyspace`, `table-name`, and
/// optional seed `rows`).
#[derive(Debug, Clone)]
pub struct TableAssetManager {
    datastore: Arc<MemoryDatastore>,
}

impl TableAssetManager {
    #[must_use]
    pub fn new(datastore: Arc<MemoryDatastore>) -> Self {
        Self { datastore }
    }
}

#[async_trait]
impl AssetManager for TableAssetManager {
    fn validate(&self, asset: &AssetDefinition) -> Result<(), String> {
        required_str(asset, "keyspace")?;
        required_str(asset, "table-name")?;
        match asset.config.get("rows") {
            None => Ok(()),
            Some(Value::Array(rows)) if rows.iter().all(Value::is_object) => Ok(()),
            Some(_) => Err("'rows' must be a list of objects".to_owned()),
        }
    }

    async fn asset_exists(&self, request: &AssetRequest<'_>) -> BackendResult<bool> {
        self.datastore.has_table(
            request_str(request, "keyspace")?,
            request_str(request, "table-name")?,
        )
    }

    async fn deploy_asset(&self, request: &AssetRequest<'_>) -> BackendResult<()> {
        let keyspace = request_str(request, "keyspace")?;
        let table = request_str(request, "table-name")?;
        self.datastore.create_table(keyspace, table)?;

        let rows = request
            .asset
            .config
            .get("rows")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object);
        for row in rows {
            self.datastore.insert(keyspace, table, row.clone())?;
        }
        Ok(())
    }

    async fn delete_asset(&self, request: &AssetRequest<'_>) -> BackendResult<()> {
        self.datastore.drop_table(
            request_str(request, "keyspace")?,
            request_str(request, "table-name")?,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn dropping_keyspace_drops_tables() {
        let store = MemoryDatastore::new();
        store.create_keyspace("vsearch").unwrap();
        store.create_table("vsearch", "documents").unwrap();
        store
            .insert("vsearch", "documents", row(json!({"id": 1, "name": "A"})))
            .unwrap();

        store.drop_keyspace("vsearch").unwrap();

        assert!(!store.has_table("vsearch", "documents").unwrap());
        let err = store.query("vsearch", "documents", &Row::new()).unwrap_err();
        assert_eq!(err.to_string(), "not found: 'vsearch' not found in keyspaces");
    }

    #[test]
    fn query_filters_by_equality() {
        let store = MemoryDatastore::new();
        store.create_keyspace("ks").unwrap();
        store.create_table("ks", "t").unwrap();
        store.insert("ks", "t", row(json!({"id": 1, "v": "a"}))).unwrap();
        store.insert("ks", "t", row(json!({"id": 2, "v": "b"}))).unwrap();

        let rows = store.query("ks", "t", &row(json!({"id": 2}))).unwrap();
        assert_eq!(rows, vec![row(json!({"id": 2, "v": "b"}))]);
    }

    #[test]
    fn table_requires_keyspace() {
        let store = MemoryDatastore::new();
        assert!(matches!(
            store.create_table("missing", "t"),
            Err(BackendError::NotFound(_))
        ));
    }

    #[test]
    fn table_asset_validation() {
        let manager = TableAssetManager::new(Arc::new(MemoryDatastore::new()));
        let asset: AssetDefinition = serde_json::from_value(json!({
            "name": "table",
            "asset-type": "memory-table",
            "config": {"keyspace": "ks", "table-name": "t", "rows": [1, 2]}
        }))
        .unwrap();

        assert_eq!(
            manager.validate(&asset).unwrap_err(),
            "'rows' must be a list of objects"
        );
    }
}

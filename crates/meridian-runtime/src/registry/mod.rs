//! Type registries mapping identifiers to implementations.
//!
//! Registration takes `&mut self` and happens while the process is being
//! composed. Resolution takes `&self`, so a fully populated registry can be
//! shared behind an `Arc` by concurrent plan builds.

mod cluster;
mod plugins;

pub use cluster::{ClusterRuntimeConfig, ClusterRuntimeRegistry, ComputeFactory, StreamingFactory};
pub use plugins::PluginsRegistry;

use std::collections::HashMap;

use tracing::debug;

use crate::error::{RuntimeError, RuntimeResult};

/// Identifier-keyed lookup table.
///
/// Registering an identifier twice replaces the earlier entry: the last
/// registration wins.
pub struct TypeRegistry<T> {
    category: &'static str,
    entries: HashMap<String, T>,
}

impl<T> TypeRegistry<T> {
    /// Create an empty registry for the given category, e.g. `agent type`.
    #[must_use]
    pub fn new(category: &'static str) -> Self {
        Self {
            category,
            entries: HashMap::new(),
        }
    }

    /// Register an entry, returning the one it replaced.
    pub fn register(&mut self, kind: impl Into<String>, entry: T) -> Option<T> {
        let kind = kind.into();
        let replaced = self.entries.insert(kind.clone(), entry);
        if replaced.is_some() {
            debug!(category = self.category, kind = %kind, "replaced registration");
        }
        replaced
    }

    /// Resolve an entry.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::UnknownKind`] when nothing is registered under
    /// `kind`.
    pub fn get(&self, kind: &str) -> RuntimeResult<&T> {
        self.entries
            .get(kind)
            .ok_or_else(|| RuntimeError::unknown_kind(self.category, kind))
    }

    /// Whether `kind` is registered.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    /// Registered identifiers, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<_> = self.entries.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> std::fmt::Debug for TypeRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("category", &self.category)
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn last_registration_wins() {
        let mut registry = TypeRegistry::new("agent type");
        assert!(registry.register("compute", 1).is_none());
        assert_eq!(registry.register("compute", 2), Some(1));
        assert_eq!(*registry.get("compute").unwrap(), 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_kind_names_category() {
        let registry: TypeRegistry<u8> = TypeRegistry::new("asset type");
        let err = registry.get("cassandra-table").unwrap_err();
        assert_eq!(err.to_string(), "unknown asset type: cassandra-table");
        assert!(registry.is_empty());
    }

    #[test]
    fn kinds_are_sorted() {
        let mut registry = TypeRegistry::new("cluster kind");
        registry.register("memory", ());
        registry.register("kafka", ());
        assert_eq!(registry.kinds(), vec!["kafka", "memory"]);
        assert!(registry.contains("kafka"));
    }
}

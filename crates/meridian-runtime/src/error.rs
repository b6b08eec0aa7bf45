//! Error types for meridian-runtime.

use std::fmt;

/// Result type alias using [`RuntimeError`].
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Result type returned by cluster and asset backends.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors reported by a backend (broker admin, orchestration API, datastore).
///
/// Backends only know the resource they were asked about; the deployer
/// wraps these into [`RuntimeError`] with tenant and operation context.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The target resource already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The target resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other backend failure (network, auth, quota).
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl BackendError {
    /// Create an opaque backend error from a message.
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into().into())
    }
}

/// A physical resource touched by the deployer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRef {
    /// An asset declared by a module.
    Asset {
        /// Owning module.
        module: String,
        /// Asset name.
        name: String,
        /// Asset type.
        asset_type: String,
    },
    /// A topic on the streaming cluster.
    Topic {
        /// Topic name.
        name: String,
    },
    /// An agent deployment on the compute cluster.
    Agent {
        /// Agent identifier.
        id: String,
    },
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asset {
                module,
                name,
                asset_type,
            } => write!(f, "asset {module}/{name} ({asset_type})"),
            Self::Topic { name } => write!(f, "topic {name}"),
            Self::Agent { id } => write!(f, "agent {id}"),
        }
    }
}

/// The side-effecting operation that was being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Checking whether a resource exists.
    Inspect,
    /// Creating a resource.
    Create,
    /// Submitting an agent to the compute cluster.
    Submit,
    /// Deleting a resource.
    Delete,
}

impl Operation {
    /// Get the operation name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inspect => "inspect",
            Self::Create => "create",
            Self::Submit => "submit",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while building or deploying an execution plan.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// A cluster kind, agent type or asset type is not registered.
    #[error("unknown {category}: {kind}")]
    UnknownKind {
        /// Registry the lookup went to, e.g. `agent type`.
        category: &'static str,
        /// The unregistered identifier.
        kind: String,
    },

    /// A step refers to a topic its module does not declare.
    #[error("agent {agent} in module {module} references undeclared topic {topic}")]
    DanglingTopicReference {
        /// Owning module.
        module: String,
        /// Step identifier.
        agent: String,
        /// Undeclared topic name.
        topic: String,
    },

    /// An identifier is declared more than once.
    #[error("duplicate {category} {id} in module {module}")]
    DuplicateIdentifier {
        /// Owning module.
        module: String,
        /// What kind of identifier, e.g. `topic`.
        category: &'static str,
        /// The duplicated identifier.
        id: String,
    },

    /// An asset names a datasource the application does not declare.
    #[error("asset {asset} in module {module} references undeclared resource {resource}")]
    DanglingResourceReference {
        /// Owning module.
        module: String,
        /// Asset name.
        asset: String,
        /// Undeclared resource name.
        resource: String,
    },

    /// An agent provider rejected the step configuration.
    #[error("invalid configuration for agent {agent}: {reason}")]
    InvalidAgentConfiguration {
        /// Agent identifier.
        agent: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An asset manager rejected the asset configuration.
    #[error("invalid configuration for asset {asset} in module {module}: {reason}")]
    InvalidAssetConfiguration {
        /// Owning module.
        module: String,
        /// Asset name.
        asset: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A cluster runtime factory rejected its configuration.
    #[error("invalid configuration for cluster kind {kind}: {reason}")]
    InvalidClusterConfiguration {
        /// Cluster kind.
        kind: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A configuration value refers to a secret that was not supplied.
    #[error("unresolved secret reference: {reference}")]
    MissingSecret {
        /// The unresolved placeholder paths.
        reference: String,
    },

    /// A resource created with mode `create` already exists.
    #[error("{resource} already exists for tenant {tenant} ({operation})")]
    ResourceAlreadyExists {
        /// Tenant the operation was scoped to.
        tenant: String,
        /// Resource identity.
        resource: ResourceRef,
        /// Operation being performed.
        operation: Operation,
    },

    /// A resource to delete or inspect does not exist.
    #[error("{resource} not found for tenant {tenant} ({operation}): {message}")]
    ResourceNotFound {
        /// Tenant the operation was scoped to.
        tenant: String,
        /// Resource identity.
        resource: ResourceRef,
        /// Operation being performed.
        operation: Operation,
        /// Backend message.
        message: String,
    },

    /// A model document or secret bundle was malformed.
    #[error(transparent)]
    Model(meridian_model::ModelError),

    /// Any other backend failure.
    #[error("failed to {operation} {resource} for tenant {tenant}: {source}")]
    Backend {
        /// Tenant the operation was scoped to.
        tenant: String,
        /// Resource identity.
        resource: ResourceRef,
        /// Operation being performed.
        operation: Operation,
        /// Underlying backend error.
        #[source]
        source: BackendError,
    },
}

impl RuntimeError {
    /// Create an unknown kind error.
    #[must_use]
    pub fn unknown_kind(category: &'static str, kind: impl Into<String>) -> Self {
        Self::UnknownKind {
            category,
            kind: kind.into(),
        }
    }

    /// Create a duplicate identifier error.
    #[must_use]
    pub fn duplicate(module: &str, category: &'static str, id: impl Into<String>) -> Self {
        Self::DuplicateIdentifier {
            module: module.to_owned(),
            category,
            id: id.into(),
        }
    }

    /// Wrap a backend error with the context of the failed operation.
    #[must_use]
    pub fn backend(
        tenant: &str,
        resource: ResourceRef,
        operation: Operation,
        error: BackendError,
    ) -> Self {
        let tenant = tenant.to_owned();
        match error {
            BackendError::AlreadyExists(_) => Self::ResourceAlreadyExists {
                tenant,
                resource,
                operation,
            },
            BackendError::NotFound(message) => Self::ResourceNotFound {
                tenant,
                resource,
                operation,
                message,
            },
            source @ BackendError::Other(_) => Self::Backend {
                tenant,
                resource,
                operation,
                source,
            },
        }
    }

    /// Whether this error was raised while building the plan, before any
    /// side effect could have happened.
    #[must_use]
    pub const fn is_plan_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownKind { .. }
                | Self::DanglingTopicReference { .. }
                | Self::DuplicateIdentifier { .. }
                | Self::DanglingResourceReference { .. }
                | Self::InvalidAgentConfiguration { .. }
                | Self::InvalidAssetConfiguration { .. }
                | Self::InvalidClusterConfiguration { .. }
        )
    }
}

impl From<meridian_model::ModelError> for RuntimeError {
    fn from(err: meridian_model::ModelError) -> Self {
        match err {
            meridian_model::ModelError::MissingSecret { reference } => {
                Self::MissingSecret { reference }
            }
            other => Self::Model(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyspace() -> ResourceRef {
        ResourceRef::Asset {
            module: "default".to_owned(),
            name: "keyspace".to_owned(),
            asset_type: "memory-keyspace".to_owned(),
        }
    }

    #[test]
    fn backend_errors_map_to_taxonomy() {
        let exists = RuntimeError::backend(
            "t1",
            keyspace(),
            Operation::Create,
            BackendError::AlreadyExists("vsearch".into()),
        );
        assert!(matches!(exists, RuntimeError::ResourceAlreadyExists { .. }));

        let missing = RuntimeError::backend(
            "t1",
            keyspace(),
            Operation::Delete,
            BackendError::NotFound("'vsearch' not found in keyspaces".into()),
        );
        assert!(missing.to_string().contains("not found in keyspaces"));
        assert!(missing.to_string().contains("tenant t1"));

        let other = RuntimeError::backend(
            "t1",
            ResourceRef::Topic {
                name: "input-topic".to_owned(),
            },
            Operation::Create,
            BackendError::other("connection refused"),
        );
        assert_eq!(
            other.to_string(),
            "failed to create topic input-topic for tenant t1: connection refused"
        );
    }

    #[test]
    fn plan_errors_are_classified() {
        assert!(RuntimeError::unknown_kind("agent type", "nope").is_plan_error());
        assert!(!RuntimeError::MissingSecret {
            reference: "secrets.a.b".to_owned()
        }
        .is_plan_error());
    }
}

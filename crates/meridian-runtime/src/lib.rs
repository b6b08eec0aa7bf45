//! Meridian runtime
//!
//! Compiles an [`Application`](meridian_model::Application) into an
//! [`ExecutionPlan`] and drives the plan's lifecycle against pluggable
//! cluster backends.
//!
//! # Architecture
//!
//! - **Registries**: [`ClusterRuntimeRegistry`] maps cluster kinds to
//!   streaming and compute runtime factories; [`PluginsRegistry`] maps agent
//!   types to providers and asset types to asset managers.
//! - **Plan builder**: [`PlanBuilder`] resolves every topic, agent and asset
//!   against the registries. It is synchronous and performs no I/O, so a
//!   malformed application fails before anything is touched.
//! - **Deployer**: [`ApplicationDeployer`] creates assets and topics
//!   according to their creation modes, submits one
//!   [`PodAgentConfiguration`] per agent, and reverses this on delete.
//!
//! ```text
//! Application ──PlanBuilder──▶ ExecutionPlan ──deploy──▶ Vec<PodAgentConfiguration>
//!                                   │
//!                                   └──────delete──▶ agents removed, assets dropped
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use meridian_runtime::{
//!     ApplicationDeployer, ClusterRuntimeConfig, ClusterRuntimeRegistry, MemoryBackends,
//!     PluginsRegistry,
//! };
//!
//! let backends = MemoryBackends::new();
//! let mut clusters = ClusterRuntimeRegistry::new(ClusterRuntimeConfig::new());
//! let mut plugins = PluginsRegistry::with_builtin_agents();
//! backends.register(&mut clusters, &mut plugins);
//!
//! let deployer = ApplicationDeployer::new(Arc::new(clusters), Arc::new(plugins));
//! let plan = deployer.create_implementation("app", &application)?;
//! let pods = deployer.deploy("tenant-1", &plan, Some(&secrets)).await?;
//! deployer.cleanup("tenant-1", &plan).await?;
//! ```

#![forbid(unsafe_code)]

pub mod agent;
pub mod asset;
pub mod cluster;
pub mod deployer;
pub mod error;
pub mod memory;
pub mod plan;
pub mod pod;
pub mod registry;

pub use agent::{AgentImplementation, AgentNodeProvider, ComponentType, GenericAgentProvider};
pub use asset::{AssetImplementation, AssetManager, AssetRequest};
pub use cluster::{ComputeClusterRuntime, ConnectionImplementation, StreamingClusterRuntime};
pub use deployer::ApplicationDeployer;
pub use error::{
    BackendError, BackendResult, Operation, ResourceRef, RuntimeError, RuntimeResult,
};
pub use memory::MemoryBackends;
pub use plan::{ExecutionPlan, PlanBuilder};
pub use pod::{
    AgentSpec, CodeStorageConfig, PodAgentConfiguration, RuntimePodConfiguration, TopicBinding,
};
pub use registry::{ClusterRuntimeConfig, ClusterRuntimeRegistry, PluginsRegistry};

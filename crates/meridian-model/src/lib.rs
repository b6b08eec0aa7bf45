//! Declarative application model for Meridian pipelines.
//!
//! An [`Application`] is the already-parsed, validated form of a streaming
//! pipeline declaration: modules with their topics, assets and ordered
//! pipeline steps, plus the instance configuration naming the streaming and
//! compute cluster kinds it targets.
//!
//! Secrets are not part of the aggregate. A [`Secrets`] bundle is loaded
//! separately and passed by reference into a single deploy or delete
//! invocation.
//!
//! # Example
//!
//! ```ignore
//! use meridian_model::{loader, Format};
//!
//! let application = loader::parse_application(yaml, Format::Yaml)?;
//! let module = application.module("default").unwrap();
//! assert_eq!(module.pipeline.len(), 2);
//! ```

#![forbid(unsafe_code)]

pub mod application;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod secrets;

pub use application::{Application, ClusterSpec, Instance, Module, Resource, DEFAULT_MODULE};
pub use error::{ModelError, ModelResult};
pub use loader::Format;
pub use pipeline::{
    AgentConfiguration, AssetDefinition, Connection, CreationMode, DeletionMode, TopicDefinition,
};
pub use secrets::{Secret, SecretValue, Secrets};

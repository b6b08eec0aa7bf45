//! Error types for meridian-model.

use std::path::PathBuf;

/// Result type alias using [`ModelError`].
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while loading or rendering the application model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A document could not be read from disk.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML document could not be parsed.
    #[error("invalid YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A configuration value refers to a secret that is not in the bundle.
    #[error("unresolved secret reference: {reference}")]
    MissingSecret {
        /// The full placeholder path, e.g. `secrets.openai.access-key`.
        reference: String,
    },

    /// A secret entry in the bundle is malformed.
    #[error("invalid secret {id}: {reason}")]
    InvalidSecret {
        /// Secret identifier.
        id: String,
        /// Why the entry was rejected.
        reason: String,
    },
}

impl ModelError {
    /// Create a missing secret error.
    #[must_use]
    pub fn missing_secret(reference: impl Into<String>) -> Self {
        Self::MissingSecret {
            reference: reference.into(),
        }
    }
}

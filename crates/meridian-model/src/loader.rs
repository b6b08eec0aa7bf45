//! Loading model documents from JSON or YAML.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::application::Application;
use crate::error::{ModelError, ModelResult};

/// Serialisation format of a model document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// JSON document.
    Json,
    /// YAML document.
    Yaml,
}

impl Format {
    /// Pick a format from a file extension.
    ///
    /// Only `.json` selects JSON. Any other extension is read as YAML, which
    /// also accepts JSON documents.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::Json,
            _ => Self::Yaml,
        }
    }

    /// Guess the format of an inline document.
    ///
    /// JSON documents start with `{` or `[`; anything else is read as YAML.
    #[must_use]
    pub fn sniff(text: &str) -> Self {
        match text.trim_start().chars().next() {
            Some('{' | '[') => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Parse a document in the given format.
pub fn parse<T: DeserializeOwned>(text: &str, format: Format) -> ModelResult<T> {
    match format {
        Format::Json => Ok(serde_json::from_str(text)?),
        Format::Yaml => Ok(serde_yaml::from_str(text)?),
    }
}

/// Read and parse a document, choosing the format from the extension.
pub fn load<T: DeserializeOwned>(path: &Path) -> ModelResult<T> {
    let text = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded document");
    parse(&text, Format::from_path(path))
}

/// Parse an application document.
pub fn parse_application(text: &str, format: Format) -> ModelResult<Application> {
    parse(text, format)
}

/// Read an application document from disk.
pub fn load_application(path: &Path) -> ModelResult<Application> {
    load(path)
}

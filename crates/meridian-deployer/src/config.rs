//! Deployer process configuration.

use std::path::Path;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use meridian_runtime::CodeStorageConfig;
use serde::Deserialize;
use thiserror::Error;

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "meridian-deployer.toml";

/// Prefix of environment variables overriding file settings.
pub const ENV_PREFIX: &str = "MERIDIAN_DEPLOYER_";

/// Log directive used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_DIRECTIVE: &str = "meridian=info";

/// Errors that can occur when loading deployer configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(Box<figment::Error>),

    #[error("configuration file not found: {0}")]
    FileNotFound(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

/// Settings for one deployer process.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeployerConfig {
    /// Default `tracing` filter directive.
    #[serde(default = "default_log")]
    pub log: String,

    /// Code storage descriptor written into every runtime pod configuration.
    #[serde(default)]
    pub code_storage: CodeStorageConfig,
}

fn default_log() -> String {
    DEFAULT_LOG_DIRECTIVE.to_owned()
}

impl Default for DeployerConfig {
    fn default() -> Self {
        Self {
            log: default_log(),
            code_storage: CodeStorageConfig::default(),
        }
    }
}

impl DeployerConfig {
    /// Load configuration from the default sources.
    ///
    /// Later sources override earlier ones:
    /// 1. Default values
    /// 2. `meridian-deployer.toml` in the current directory (if present)
    /// 3. Environment variables with the `MERIDIAN_DEPLOYER_` prefix
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment(Toml::file(DEFAULT_CONFIG_FILE))
            .extract()
            .map_err(ConfigError::from)
    }

    /// Load configuration from an explicit TOML file, which must exist.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        Self::figment(Toml::file(path))
            .extract()
            .map_err(ConfigError::from)
    }

    /// Load from `path` when given, otherwise from the default sources.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(Self::load, Self::load_from)
    }

    /// Parse configuration from a TOML string, without environment overrides.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Figment::new()
            .merge(Toml::string(content))
            .extract()
            .map_err(ConfigError::from)
    }

    fn figment(file: figment::providers::Data<Toml>) -> Figment {
        Figment::new()
            .merge(file)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_apply_to_empty_document() {
        let config = DeployerConfig::parse("").unwrap();
        assert_eq!(config, DeployerConfig::default());
        assert_eq!(config.log, "meridian=info");
        assert_eq!(config.code_storage.storage_type, "none");
    }

    #[test]
    fn parses_code_storage() {
        let config = DeployerConfig::parse(
            r#"
log = "meridian=debug"

[code_storage]
type = "s3"
archive_id = "archive-1"

[code_storage.configuration]
bucket = "code"
"#,
        )
        .unwrap();

        assert_eq!(config.log, "meridian=debug");
        assert_eq!(config.code_storage.storage_type, "s3");
        assert_eq!(config.code_storage.archive_id.as_deref(), Some("archive-1"));
        assert_eq!(config.code_storage.configuration["bucket"], "code");
    }

    #[test]
    fn explicit_file_must_exist() {
        let err = DeployerConfig::load_from("/nonexistent/meridian-deployer.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn loads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[code_storage]\ntype = \"local\"").unwrap();

        let config = DeployerConfig::resolve(Some(file.path())).unwrap();
        assert_eq!(config.code_storage.storage_type, "local");
    }
}

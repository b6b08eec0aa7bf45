//! Common test utilities for deployer integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use meridian_deployer::{DeploymentArgs, ErrorHandler};
use tempfile::TempDir;

/// Two steps over two topics, with a secret placeholder in the first step.
pub const APPLICATION_YAML: &str = r#"
instance:
  streaming-cluster:
    type: memory
  compute-cluster:
    type: memory
modules:
  - id: default
    topics:
      - name: input-topic
        creation-mode: create-if-not-exists
      - name: output-topic
        creation-mode: create-if-not-exists
    pipeline:
      - type: compute
        input: input-topic
        configuration:
          api-key: "${secrets.openai.access-key}"
      - type: drop
        output: output-topic
"#;

pub const SECRETS_YAML: &str = r#"
secrets:
  - id: openai
    name: OpenAI
    data:
      access-key: sk-test
"#;

/// Input files written into a temporary directory.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Cluster configuration, deployer configuration embedding
    /// `application_yaml`, and optionally the secrets bundle.
    pub fn args(&self, application_yaml: &str, with_secrets: bool) -> DeploymentArgs {
        let app_config = serde_json::json!({
            "name": "enrich",
            "tenant": "t1",
            "application": application_yaml,
        });
        DeploymentArgs {
            cluster_config: self.write(
                "cluster.json",
                r#"{"memory": {"namespace-prefix": "meridian-"}}"#,
            ),
            app_config: self.write("app.json", &app_config.to_string()),
            secrets: with_secrets.then(|| self.write("secrets.yaml", SECRETS_YAML)),
        }
    }
}

/// Error handler that keeps the rendered error chain.
#[derive(Default)]
pub struct RecordingHandler {
    pub errors: Mutex<Vec<String>>,
}

impl RecordingHandler {
    pub fn messages(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl ErrorHandler for RecordingHandler {
    fn handle(&self, error: &anyhow::Error) -> ExitCode {
        self.errors.lock().unwrap().push(format!("{error:#}"));
        ExitCode::FAILURE
    }
}

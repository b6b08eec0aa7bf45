//! Deploy and delete through the command surface.

#![allow(clippy::unwrap_used)]

mod common;

use std::process::ExitCode;

use clap::Parser;
use common::{RecordingHandler, Workspace, APPLICATION_YAML};
use meridian_deployer::commands::{delete, deploy};
use meridian_deployer::{run, Cli, Command, DeployerConfig};
use meridian_runtime::{CodeStorageConfig, MemoryBackends};

fn cli(command: Command) -> Cli {
    Cli {
        config: None,
        command,
    }
}

#[tokio::test]
async fn deploy_returns_runtime_pod_configurations() {
    let workspace = Workspace::new();
    let backends = MemoryBackends::new();
    let config = DeployerConfig {
        code_storage: CodeStorageConfig {
            storage_type: "local".to_owned(),
            archive_id: Some("archive-1".to_owned()),
            ..CodeStorageConfig::default()
        },
        ..DeployerConfig::default()
    };

    let pods = deploy::run(&workspace.args(APPLICATION_YAML, true), &config, &backends)
        .await
        .unwrap();

    assert_eq!(pods.len(), 2);
    let first = &pods[0];
    assert_eq!(first.agent_spec.agent_id, "enrich-step1");
    assert_eq!(first.agent_spec.tenant, "t1");
    assert_eq!(first.agent_spec.configuration["api-key"], "sk-test");
    assert_eq!(first.input.as_ref().unwrap().topic, "input-topic");
    assert_eq!(first.code_storage_config.storage_type, "local");
    assert_eq!(pods[1].output.as_ref().unwrap().topic, "output-topic");

    assert_eq!(backends.pods.pods("meridian-t1").unwrap().len(), 2);
    assert!(backends.broker.contains("t1", "output-topic").unwrap());
}

#[tokio::test]
async fn pod_configurations_serialize_in_camel_case() {
    let workspace = Workspace::new();
    let pods = deploy::run(
        &workspace.args(APPLICATION_YAML, true),
        &DeployerConfig::default(),
        &MemoryBackends::new(),
    )
    .await
    .unwrap();

    let json = serde_json::to_value(&pods).unwrap();
    assert_eq!(json[0]["agentSpec"]["agentId"], "enrich-step1");
    assert_eq!(json[0]["agentSpec"]["componentType"], "PROCESSOR");
    assert_eq!(json[0]["streamingClusterConfig"]["type"], "memory");
    assert_eq!(json[0]["codeStorageConfig"]["type"], "none");
}

#[tokio::test]
async fn deploy_then_delete_with_shared_backends() {
    let workspace = Workspace::new();
    let backends = MemoryBackends::new();
    let handler = RecordingHandler::default();
    let args = workspace.args(APPLICATION_YAML, true);

    let deployed = run(
        cli(Command::Deploy(args.clone())),
        &DeployerConfig::default(),
        &backends,
        &handler,
    )
    .await;
    let deleted = run(
        cli(Command::Delete(args)),
        &DeployerConfig::default(),
        &backends,
        &handler,
    )
    .await;

    assert_eq!(deployed, ExitCode::SUCCESS);
    assert_eq!(deleted, ExitCode::SUCCESS);
    assert!(handler.messages().is_empty());
    assert!(backends.pods.pods("meridian-t1").unwrap().is_empty());
}

#[tokio::test]
async fn deleting_undeployed_application_reports_not_found() {
    let workspace = Workspace::new();
    let handler = RecordingHandler::default();

    let code = run(
        cli(Command::Delete(workspace.args(APPLICATION_YAML, true))),
        &DeployerConfig::default(),
        &MemoryBackends::new(),
        &handler,
    )
    .await;

    assert_eq!(code, ExitCode::FAILURE);
    let messages = handler.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("not found"), "{}", messages[0]);
}

#[tokio::test]
async fn missing_secrets_fail_before_submission() {
    let workspace = Workspace::new();
    let backends = MemoryBackends::new();

    let err = deploy::run(
        &workspace.args(APPLICATION_YAML, false),
        &DeployerConfig::default(),
        &backends,
    )
    .await
    .unwrap_err();

    assert!(format!("{err:#}").contains("secrets.openai.access-key"));
    assert!(backends.pods.pods("meridian-t1").unwrap().is_empty());
    assert!(!backends.broker.contains("t1", "input-topic").unwrap());
}

#[tokio::test]
async fn unknown_agent_type_fails_at_plan_build() {
    let workspace = Workspace::new();
    let backends = MemoryBackends::new();
    let application = APPLICATION_YAML.replace("type: drop", "type: teleport");

    let err = deploy::run(
        &workspace.args(&application, true),
        &DeployerConfig::default(),
        &backends,
    )
    .await
    .unwrap_err();

    assert!(format!("{err:#}").contains("teleport"));
    assert!(backends.pods.pods("meridian-t1").unwrap().is_empty());
}

#[tokio::test]
async fn missing_input_file_names_the_path() {
    let workspace = Workspace::new();
    let mut args = workspace.args(APPLICATION_YAML, true);
    args.app_config = workspace.path("absent.json");

    let err = delete::run(&args, &MemoryBackends::new()).await.unwrap_err();
    assert!(format!("{err:#}").contains("absent.json"));
}

#[test]
fn parses_command_line() {
    let cli = Cli::try_parse_from([
        "meridian-deployer",
        "deploy",
        "cluster.yaml",
        "app.yaml",
        "secrets.yaml",
        "--config",
        "deployer.toml",
    ])
    .unwrap();

    assert_eq!(cli.config.unwrap().to_str(), Some("deployer.toml"));
    let Command::Deploy(args) = cli.command else {
        panic!("expected deploy");
    };
    assert_eq!(args.secrets.unwrap().to_str(), Some("secrets.yaml"));
}

#[test]
fn secrets_argument_is_optional() {
    let cli = Cli::try_parse_from(["meridian-deployer", "delete", "c.json", "a.json"]).unwrap();
    assert!(matches!(cli.command, Command::Delete(ref args) if args.secrets.is_none()));
}

//! Meridian deployer
//!
//! Command-line entry point that compiles an application into an execution
//! plan and deploys or deletes it against the registered cluster backends.
//!
//! ```text
//! meridian-deployer deploy <cluster-config> <app-config> [secrets]
//! meridian-deployer delete <cluster-config> <app-config> [secrets]
//! ```
//!
//! `deploy` prints the runtime pod configurations as a JSON array on stdout.
//! Logs go to stderr. Failures are passed to an [`ErrorHandler`], which
//! decides the exit code.

#![forbid(unsafe_code)]

pub mod commands;
pub mod config;
pub mod error_handler;
pub mod input;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use meridian_runtime::{MemoryBackends, RuntimePodConfiguration};

pub use commands::DeploymentArgs;
pub use config::DeployerConfig;
pub use error_handler::{ErrorHandler, LogAndExit};
pub use input::{ApplicationSource, RuntimeDeployerConfiguration};

#[derive(Debug, Parser)]
#[command(name = "meridian-deployer")]
#[command(about = "Deploy and delete Meridian applications")]
#[command(version)]
pub struct Cli {
    /// Deployer configuration file (defaults to meridian-deployer.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Deploy an application and print its runtime pod configurations
    Deploy(DeploymentArgs),

    /// Delete a deployed application
    Delete(DeploymentArgs),
}

/// Run a parsed command line against `backends`.
pub async fn run(
    cli: Cli,
    config: &DeployerConfig,
    backends: &MemoryBackends,
    handler: &dyn ErrorHandler,
) -> ExitCode {
    let result = match cli.command {
        Command::Deploy(args) => commands::deploy::run(&args, config, backends)
            .await
            .and_then(|pods| print_pods(&pods)),
        Command::Delete(args) => commands::delete::run(&args, backends).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => handler.handle(&e),
    }
}

fn print_pods(pods: &[RuntimePodConfiguration]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(pods).context("serializing pod configurations")?;
    println!("{json}");
    Ok(())
}

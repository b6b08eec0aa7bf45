//! Meridian deployer binary.

use std::process::ExitCode;

use clap::Parser;
use meridian_deployer::config::DEFAULT_LOG_DIRECTIVE;
use meridian_deployer::{run, Cli, DeployerConfig, ErrorHandler, LogAndExit};
use meridian_runtime::MemoryBackends;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = DeployerConfig::resolve(cli.config.as_deref());

    let directive = config
        .as_ref()
        .map_or(DEFAULT_LOG_DIRECTIVE, |config| config.log.as_str());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)),
        )
        .init();

    let config = match config {
        Ok(config) => config,
        Err(e) => return LogAndExit.handle(&e.into()),
    };

    run(cli, &config, &MemoryBackends::new(), &LogAndExit).await
}

//! Top-level failure handling.

use std::process::ExitCode;

use tracing::error;

/// Receives the error that ended a command and decides the exit code.
pub trait ErrorHandler {
    fn handle(&self, error: &anyhow::Error) -> ExitCode;
}

/// Logs the error chain at `error` level and exits with failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAndExit;

impl ErrorHandler for LogAndExit {
    fn handle(&self, error: &anyhow::Error) -> ExitCode {
        error!(error = %format!("{error:#}"), "deployer command failed");
        ExitCode::FAILURE
    }
}

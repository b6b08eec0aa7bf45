//! Implementation of the `meridian-deployer delete` command.

use anyhow::Context;
use meridian_runtime::MemoryBackends;
use tracing::info;

use super::{DeploymentArgs, Session};

/// Delete the application's agents and the assets marked for deletion.
pub async fn run(args: &DeploymentArgs, backends: &MemoryBackends) -> anyhow::Result<()> {
    let session = Session::open(args, backends)?;

    session
        .deployer
        .delete_with_secrets(&session.tenant, &session.plan, session.secrets.as_ref())
        .await
        .with_context(|| format!("deleting {}", session.plan.application_id()))?;
    info!(
        tenant = %session.tenant,
        application = %session.plan.application_id(),
        "application deleted"
    );
    Ok(())
}

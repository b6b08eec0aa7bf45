//! Implementation of the `meridian-deployer deploy` command.

use anyhow::Context;
use meridian_runtime::{MemoryBackends, RuntimePodConfiguration};
use tracing::info;

use super::{DeploymentArgs, Session};
use crate::config::DeployerConfig;

/// Deploy the application and return one runtime pod configuration per
/// agent, in submission order.
pub async fn run(
    args: &DeploymentArgs,
    config: &DeployerConfig,
    backends: &MemoryBackends,
) -> anyhow::Result<Vec<RuntimePodConfiguration>> {
    let session = Session::open(args, backends)?;

    let pods = session
        .deployer
        .deploy(&session.tenant, &session.plan, session.secrets.as_ref())
        .await
        .with_context(|| format!("deploying {}", session.plan.application_id()))?;
    info!(
        tenant = %session.tenant,
        application = %session.plan.application_id(),
        pods = pods.len(),
        "application deployed"
    );

    Ok(pods
        .into_iter()
        .map(|pod| pod.into_runtime(config.code_storage.clone()))
        .collect())
}

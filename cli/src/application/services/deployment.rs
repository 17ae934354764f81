//! Application service: template deployment polling.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;

use crate::application::ports::{Deployments, Logger};
use crate::domain::{DeploymentRun, ProvisioningState};

/// Cooperative cancellation observed between poll iterations.
///
/// The poll loop subscribes to the signal only while it runs, so the
/// signal owner can tell whether anything is listening.
#[derive(Clone, Default)]
pub struct Cancellation {
    signal: Option<Arc<watch::Sender<bool>>>,
}

impl Cancellation {
    /// A cancellation that never fires.
    #[must_use]
    pub fn never() -> Self {
        Self::default()
    }

    /// Observe the given signal; `true` means cancelled.
    #[must_use]
    pub fn new(signal: Arc<watch::Sender<bool>>) -> Self {
        Self {
            signal: Some(signal),
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.signal.as_ref().is_some_and(|s| *s.borrow())
    }

    fn subscribe(&self) -> Option<watch::Receiver<bool>> {
        self.signal.as_ref().map(|s| s.subscribe())
    }
}

/// Resolve once cancellation is requested. Pends forever otherwise.
async fn cancelled(watcher: Option<&mut watch::Receiver<bool>>) {
    let Some(watcher) = watcher else {
        return std::future::pending().await;
    };
    if watcher.wait_for(|cancelled| *cancelled).await.is_err() {
        // Sender dropped without cancelling.
        std::future::pending::<()>().await;
    }
}

/// Poll loop settings.
#[derive(Clone)]
pub struct PollOptions {
    /// Fixed delay before each refresh. No backoff.
    pub interval: Duration,
    pub cancel: Cancellation,
}

/// Poll a submitted deployment until it reaches a terminal state.
///
/// The run starts as `Running`. Each iteration sleeps for the fixed interval
/// then refreshes the state from the provider. There is no iteration cap.
///
/// # Errors
///
/// Returns an error if a refresh fails or cancellation is requested. The
/// deployment itself is left as last observed.
pub async fn wait_for_completion(
    deployments: &impl Deployments,
    resource_group: &str,
    name: &str,
    opts: &PollOptions,
    logger: &(impl Logger + ?Sized),
) -> Result<DeploymentRun> {
    let mut run = DeploymentRun::submitted(resource_group, name, ProvisioningState::Running);
    let mut watcher = opts.cancel.subscribe();

    while !run.state.is_terminal() {
        anyhow::ensure!(
            !opts.cancel.is_cancelled(),
            "cancelled while deployment {name} was {}",
            run.state
        );
        tokio::select! {
            () = tokio::time::sleep(opts.interval) => {}
            () = cancelled(watcher.as_mut()) => {
                anyhow::bail!("cancelled while deployment {name} was {}", run.state);
            }
        }

        let raw = deployments
            .refresh(resource_group, name)
            .await
            .with_context(|| format!("refreshing deployment {name}"))?;
        run.observe(ProvisioningState::parse(&raw), opts.interval);

        if !run.state.is_terminal() {
            logger.verbose(&format!(
                "Deployment running ({}s)",
                run.elapsed.as_secs()
            ));
        }
    }

    Ok(run)
}

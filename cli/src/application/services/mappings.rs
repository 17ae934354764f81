//! Application service: removal of work-tracking mappings of an instance.
//!
//! A mapping is a service hook subscription whose web hook targets the
//! instance's host.

use anyhow::{Context, Result};

use crate::application::ports::{HookSubscription, Logger, ServiceHooks};
use crate::domain::InstanceName;

/// Delete every service hook subscription that posts to `instance`.
///
/// Returns the number of subscriptions removed.
///
/// # Errors
///
/// Returns an error if subscriptions cannot be listed or deleted.
pub async fn remove_instance_mappings(
    hooks: &impl ServiceHooks,
    instance: &InstanceName,
    logger: &(impl Logger + ?Sized),
) -> Result<usize> {
    let host = instance.dns_host_name();
    logger.verbose(&format!("Searching mappings to {host}..."));
    let subscriptions = hooks
        .list_subscriptions()
        .await
        .context("listing service hook subscriptions")?;

    let mut removed = 0;
    for subscription in subscriptions.iter().filter(|s| targets_host(s, &host)) {
        logger.verbose(&format!(
            "Deleting {} mapping {}",
            subscription.event_type, subscription.id
        ));
        hooks
            .delete_subscription(&subscription.id)
            .await
            .with_context(|| format!("deleting subscription {}", subscription.id))?;
        removed += 1;
    }
    logger.info(&format!("{removed} mapping(s) to {instance} removed."));
    Ok(removed)
}

fn targets_host(subscription: &HookSubscription, host: &str) -> bool {
    subscription.target_url.as_deref().is_some_and(|url| {
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .unwrap_or(url);
        let authority = rest.split(['/', '?']).next().unwrap_or_default();
        let hostname = authority.split(':').next().unwrap_or_default();
        hostname.eq_ignore_ascii_case(host)
    })
}

//! Application service: writing aggregator settings into an instance.
//!
//! Shared by initial provisioning and token rotation.

use anyhow::{Context, Result};

use crate::application::ports::{AppSettings, CredentialStore, Logger};
use crate::domain::{AggregatorConfiguration, InstanceName, LogonOutcome, Provider, VstsLogon};

/// Write the cached VSTS token into the instance's app settings.
///
/// Returns `Ok(false)` without touching the instance when no usable VSTS
/// logon is cached or its token kind is unsupported.
///
/// # Errors
///
/// Returns an error if the credential cache or the app settings cannot be
/// read or written.
pub async fn write_configuration(
    azure: &impl AppSettings,
    credentials: &impl CredentialStore,
    instance: &InstanceName,
    logger: &(impl Logger + ?Sized),
) -> Result<bool> {
    let logon = match credentials.load::<VstsLogon>()? {
        LogonOutcome::Succeeded(logon) => logon,
        LogonOutcome::NoCachedCredential => {
            logger.warning(&format!(
                "No cached VSTS credential: use the {} command.",
                Provider::Vsts.logon_command()
            ));
            return Ok(false);
        }
        LogonOutcome::Expired => {
            logger.warning(&format!(
                "Cached VSTS credential expired: use the {} command.",
                Provider::Vsts.logon_command()
            ));
            return Ok(false);
        }
    };

    let configuration = match AggregatorConfiguration::from_logon(&logon) {
        Ok(configuration) => configuration,
        Err(e) => {
            logger.warning(&e.to_string());
            return Ok(false);
        }
    };

    logger.verbose("Saving VSTS token");
    apply(azure, instance, &configuration).await?;
    logger.info("VSTS token saved");
    Ok(true)
}

/// Merge `configuration` over the instance's current settings and write them.
///
/// # Errors
///
/// Returns an error if the settings cannot be read or written.
pub async fn apply(
    azure: &impl AppSettings,
    instance: &InstanceName,
    configuration: &AggregatorConfiguration,
) -> Result<()> {
    let rg = instance.resource_group_name();
    let app = instance.function_app_name();
    let current = azure
        .read_settings(&rg, &app)
        .await
        .with_context(|| format!("reading settings of {app}"))?;
    let merged = configuration.apply_to(&current);
    azure
        .write_settings(&rg, &app, &merged)
        .await
        .with_context(|| format!("writing settings of {app}"))
}

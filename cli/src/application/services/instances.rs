//! Application service: Aggregator instance provisioning and teardown.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use anyhow::{Context, Result};

use crate::application::ports::{
    AzureManagement, CredentialStore, DeploymentRequest, Logger, PackageCache, ReleaseSource,
    TemplateSource,
};
use crate::application::services::configuration::write_configuration;
use crate::application::services::deployment::{PollOptions, wait_for_completion};
use crate::application::services::runtime_package::RuntimePackage;
use crate::domain::{InstanceName, ProvisioningState};

/// Template parameter that receives the Function App name.
pub const APP_NAME_PARAMETER: &str = "appName";

/// Prefix and maximum length of generated deployment names.
const DEPLOYMENT_NAME_PREFIX: &str = "aggregator";
const DEPLOYMENT_NAME_MAX_LEN: usize = 24;

/// An instance found in the subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceLocation {
    pub instance: InstanceName,
    pub location: String,
}

/// Provisioning pipeline for Aggregator instances.
pub struct AggregatorInstances<'a, M, S, L: ?Sized> {
    azure: &'a M,
    credentials: &'a S,
    logger: &'a L,
}

impl<'a, M, S, L> AggregatorInstances<'a, M, S, L>
where
    M: AzureManagement,
    S: CredentialStore,
    L: Logger + ?Sized,
{
    #[must_use]
    pub fn new(azure: &'a M, credentials: &'a S, logger: &'a L) -> Self {
        Self {
            azure,
            credentials,
            logger,
        }
    }

    /// List every instance in the subscription with its region.
    ///
    /// # Errors
    ///
    /// Returns an error if resource groups cannot be listed.
    pub async fn list_all(&self) -> Result<Vec<InstanceLocation>> {
        let groups = self.azure.list().await.context("listing resource groups")?;
        Ok(groups
            .into_iter()
            .filter(|rg| InstanceName::is_instance_resource_group(&rg.name))
            .filter_map(|rg| {
                InstanceName::from_resource_group_name(&rg.name)
                    .ok()
                    .map(|instance| InstanceLocation {
                        instance,
                        location: rg.location,
                    })
            })
            .collect())
    }

    /// List the instances hosted in `location`.
    ///
    /// # Errors
    ///
    /// Returns an error if resource groups cannot be listed.
    pub async fn list_by_location(&self, location: &str) -> Result<Vec<InstanceName>> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .filter(|found| found.location.eq_ignore_ascii_case(location))
            .map(|found| found.instance)
            .collect())
    }

    /// Provision `instance` in `location`, install the runtime and write its
    /// configuration.
    ///
    /// Returns `Ok(true)` only if both the runtime upload and the
    /// configuration write succeed. A failed or cancelled deployment returns
    /// `Ok(false)` before touching the runtime. Every step is safe to re-run.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource group or deployment calls fail, or if
    /// polling is cancelled.
    pub async fn add<R: ReleaseSource, C: PackageCache>(
        &self,
        instance: &InstanceName,
        location: &str,
        template: &impl TemplateSource,
        runtime: &RuntimePackage<'_, R, C>,
        poll: &PollOptions,
    ) -> Result<bool> {
        let rg_name = instance.resource_group_name();
        self.ensure_resource_group(&rg_name, location).await?;

        let template = template
            .instance_template()
            .context("loading instance template")?;
        if !has_app_name_parameter(&template) {
            self.logger
                .warning("Something is wrong with the ARM template: appName parameter not found");
        }

        let parameters = serde_json::json!({
            APP_NAME_PARAMETER: { "value": instance.function_app_name() }
        });
        let deployment_name = self
            .azure
            .random_name(DEPLOYMENT_NAME_PREFIX, DEPLOYMENT_NAME_MAX_LEN);
        self.logger
            .info(&format!("Started deployment {deployment_name}"));
        self.azure
            .submit(&DeploymentRequest {
                resource_group: &rg_name,
                name: &deployment_name,
                template: &template,
                parameters: &parameters,
            })
            .await
            .with_context(|| format!("submitting deployment {deployment_name}"))?;

        let run =
            wait_for_completion(self.azure, &rg_name, &deployment_name, poll, self.logger).await?;
        match run.state {
            ProvisioningState::Succeeded => {
                self.logger.info(&format!("Deployment {}", run.state));
            }
            _ => {
                self.logger.error(&format!(
                    "Deployment {} {}: re-run the install.instance command to retry",
                    deployment_name, run.state
                ));
                return Ok(false);
            }
        }

        let Some(package) = runtime.resolve(self.logger).await else {
            self.logger
                .error("No runtime package available: cannot complete the instance");
            return Ok(false);
        };
        if !runtime
            .upload_runtime_zip(self.azure, instance, &package, self.logger)
            .await
        {
            return Ok(false);
        }

        write_configuration(self.azure, self.credentials, instance, self.logger).await
    }

    /// Delete the resource group of `instance`.
    ///
    /// A missing instance is reported as a warning and counts as removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the existence check or the deletion fails.
    pub async fn remove(&self, instance: &InstanceName, location: &str) -> Result<bool> {
        let rg_name = instance.resource_group_name();
        self.logger
            .verbose(&format!("Searching instance {instance}..."));
        if self
            .azure
            .exists(&rg_name)
            .await
            .with_context(|| format!("checking resource group {rg_name}"))?
        {
            self.logger
                .verbose(&format!("Deleting resource group {rg_name}"));
            self.azure
                .delete(&rg_name)
                .await
                .with_context(|| format!("deleting resource group {rg_name}"))?;
            self.logger
                .info(&format!("Resource group {rg_name} deleted."));
        } else {
            self.logger
                .warning(&format!("Instance {instance} not found in {location}."));
        }
        Ok(true)
    }

    /// Rewrite the instance configuration with the cached VSTS token,
    /// leaving deployment and runtime untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the app settings cannot be read or written.
    pub async fn set_authentication(&self, instance: &InstanceName) -> Result<bool> {
        write_configuration(self.azure, self.credentials, instance, self.logger).await
    }

    async fn ensure_resource_group(&self, rg_name: &str, location: &str) -> Result<()> {
        if self
            .azure
            .exists(rg_name)
            .await
            .with_context(|| format!("checking resource group {rg_name}"))?
        {
            self.logger
                .verbose(&format!("Resource group {rg_name} already exists"));
            return Ok(());
        }
        self.logger
            .verbose(&format!("Creating resource group {rg_name}"));
        self.azure
            .create(rg_name, location)
            .await
            .with_context(|| format!("creating resource group {rg_name}"))?;
        self.logger
            .info(&format!("Resource group {rg_name} created."));
        Ok(())
    }
}

/// Minimal sanity check: the template declares the app name parameter.
#[must_use]
pub fn has_app_name_parameter(template: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(template)
        .ok()
        .and_then(|t| t.get("parameters")?.get(APP_NAME_PARAMETER).cloned())
        .is_some()
}

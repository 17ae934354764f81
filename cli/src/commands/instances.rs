//! `list.instances`, `install.instance`, `configure.instance`,
//! `uninstall.instance`.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::instances::{AggregatorInstances, InstanceLocation};
use crate::application::services::mappings::remove_instance_mappings;
use crate::application::services::runtime_package::RuntimePackage;
use crate::application::services::session::{self, SessionConfig};
use crate::commands::exit_code;
use crate::domain::InstanceName;
use crate::infra::template::EmbeddedTemplate;
use crate::output::json;

/// Arguments for `list.instances`.
#[derive(Args)]
pub struct ListArgs {
    /// Only list instances in this Azure region
    #[arg(short, long)]
    pub location: Option<String>,
}

/// Instance name and region, shared by the per-instance verbs.
#[derive(Args)]
pub struct InstanceArgs {
    /// Aggregator instance name
    #[arg(short, long)]
    pub name: String,
    /// Aggregator instance location (Azure region)
    #[arg(short, long)]
    pub location: String,
}

/// Arguments for `install.instance`.
#[derive(Args)]
pub struct InstallArgs {
    #[command(flatten)]
    pub instance: InstanceArgs,
}

/// Arguments for `configure.instance`.
#[derive(Args)]
pub struct ConfigureArgs {
    #[command(flatten)]
    pub instance: InstanceArgs,
    /// Refresh the VSTS token stored in the instance
    #[arg(short, long)]
    pub authentication: bool,
}

/// Arguments for `uninstall.instance`.
#[derive(Args)]
pub struct UninstallArgs {
    #[command(flatten)]
    pub instance: InstanceArgs,
    /// Keep VSTS service hooks that target the instance
    #[arg(short = 'm', long)]
    pub dont_remove_mappings: bool,
}

/// Run `list.instances`.
///
/// # Errors
///
/// Returns an error if the Azure session cannot be built or listing fails.
pub async fn list(app: &AppContext, args: &ListArgs) -> Result<ExitCode> {
    let logger = app.logger();
    let store = app.credential_store();
    let session = session::build(
        SessionConfig::NONE.with_azure(),
        &store,
        &app.connector(),
        &logger,
    )
    .await?;
    let instances = AggregatorInstances::new(session.azure()?, &store, &logger);

    let found: Vec<InstanceLocation> = match &args.location {
        Some(location) => instances
            .list_by_location(location)
            .await?
            .into_iter()
            .map(|instance| InstanceLocation {
                instance,
                location: location.clone(),
            })
            .collect(),
        None => instances.list_all().await?,
    };

    if app.json {
        println!("{}", json::format_instances(&found)?);
        return Ok(ExitCode::SUCCESS);
    }
    if found.is_empty() {
        app.output.info("No aggregator instances found.");
        return Ok(ExitCode::SUCCESS);
    }
    for f in &found {
        app.output.kv(f.instance.plain_name(), &f.location);
    }
    Ok(ExitCode::SUCCESS)
}

/// Run `install.instance`.
///
/// # Errors
///
/// Returns an error if the name is invalid, the session cannot be built, or
/// provisioning fails outright.
pub async fn install(app: &AppContext, args: &InstallArgs) -> Result<ExitCode> {
    let instance = InstanceName::new(&args.instance.name)?;
    let requirement = app.config.runtime.version_requirement()?;
    let logger = app.logger();
    let store = app.credential_store();
    let session = session::build(
        SessionConfig::NONE.with_azure(),
        &store,
        &app.connector(),
        &logger,
    )
    .await?;

    let source = app.release_source();
    let cache = app.package_cache();
    let runtime = RuntimePackage::new(&source, &cache, requirement);
    let instances = AggregatorInstances::new(session.azure()?, &store, &logger);
    let ok = instances
        .add(
            &instance,
            &args.instance.location,
            &EmbeddedTemplate,
            &runtime,
            &app.poll_options(),
        )
        .await?;
    if ok {
        app.output
            .success(&format!("Instance {instance} ready at {}", instance.dns_host_name()));
    }
    Ok(exit_code(ok))
}

/// Run `configure.instance`.
///
/// # Errors
///
/// Returns an error if the name is invalid, the session cannot be built, or
/// the app settings cannot be updated.
pub async fn configure(app: &AppContext, args: &ConfigureArgs) -> Result<ExitCode> {
    let instance = InstanceName::new(&args.instance.name)?;
    if !args.authentication {
        app.output
            .warn("Nothing to configure: pass --authentication to refresh the VSTS token.");
        return Ok(ExitCode::SUCCESS);
    }
    let logger = app.logger();
    let store = app.credential_store();
    let session = session::build(
        SessionConfig::NONE.with_azure(),
        &store,
        &app.connector(),
        &logger,
    )
    .await?;
    let instances = AggregatorInstances::new(session.azure()?, &store, &logger);
    let ok = instances.set_authentication(&instance).await?;
    Ok(exit_code(ok))
}

/// Run `uninstall.instance`.
///
/// # Errors
///
/// Returns an error if the name is invalid, the session cannot be built, or
/// the mappings or resource group cannot be removed.
pub async fn uninstall(app: &AppContext, args: &UninstallArgs) -> Result<ExitCode> {
    let instance = InstanceName::new(&args.instance.name)?;
    let config = if args.dont_remove_mappings {
        SessionConfig::NONE.with_azure()
    } else {
        SessionConfig::NONE.with_azure().with_vsts()
    };
    let logger = app.logger();
    let store = app.credential_store();
    let session = session::build(config, &store, &app.connector(), &logger).await?;

    if !args.dont_remove_mappings {
        let removed = remove_instance_mappings(session.vsts()?, &instance, &logger).await?;
        app.output
            .info(&format!("Removed {removed} mapping(s) to {instance}"));
    }

    let instances = AggregatorInstances::new(session.azure()?, &store, &logger);
    let ok = instances.remove(&instance, &args.instance.location).await?;
    Ok(exit_code(ok))
}

//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::domain::{
    AzureLogon, CachedPackage, CliConfig, InstanceName, LogonData, LogonOutcome,
    RuntimePackageRef, VstsLogon,
};

// ── Value Types ───────────────────────────────────────────────────────────────

/// A resource group as listed by Azure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceGroupInfo {
    pub name: String,
    /// Azure region, e.g. `"westeurope"`.
    pub location: String,
}

/// One template deployment submission.
pub struct DeploymentRequest<'a> {
    pub resource_group: &'a str,
    /// Unique deployment name.
    pub name: &'a str,
    /// Template document, passed through verbatim.
    pub template: &'a str,
    /// Bound template parameters (`{"appName": {"value": ...}}`).
    pub parameters: &'a serde_json::Value,
}

/// A work-tracking service hook subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookSubscription {
    pub id: String,
    pub event_type: String,
    /// URL the hook posts to, when the consumer is a web hook.
    pub target_url: Option<String>,
}

// ── Logging Port ──────────────────────────────────────────────────────────────

/// Abstracts operator-facing logging so services can emit messages without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait Logger {
    /// Detail shown only in verbose mode.
    fn verbose(&self, message: &str);
    /// Progress or result message.
    fn info(&self, message: &str);
    /// Something went wrong but the operation continues.
    fn warning(&self, message: &str);
    /// The operation failed.
    fn error(&self, message: &str);
}

// ── Azure Port Traits ─────────────────────────────────────────────────────────

/// Resource group lifecycle.
#[allow(async_fn_in_trait)]
pub trait ResourceGroups {
    /// List every resource group of the subscription.
    async fn list(&self) -> Result<Vec<ResourceGroupInfo>>;
    /// Check whether a resource group exists.
    async fn exists(&self, name: &str) -> Result<bool>;
    /// Create a resource group in `location`.
    async fn create(&self, name: &str, location: &str) -> Result<()>;
    /// Delete a resource group and everything in it. Returns once deleted.
    async fn delete(&self, name: &str) -> Result<()>;
}

/// Template deployment lifecycle.
#[allow(async_fn_in_trait)]
pub trait Deployments {
    /// Submit an incremental deployment. Returns once it is accepted.
    async fn submit(&self, request: &DeploymentRequest<'_>) -> Result<()>;
    /// Fetch the current `provisioningState` of a deployment.
    async fn refresh(&self, resource_group: &str, name: &str) -> Result<String>;
}

/// App settings of a deployed Function App.
#[allow(async_fn_in_trait)]
pub trait AppSettings {
    async fn read_settings(
        &self,
        resource_group: &str,
        app_name: &str,
    ) -> Result<BTreeMap<String, String>>;
    /// Replace the whole settings collection.
    async fn write_settings(
        &self,
        resource_group: &str,
        app_name: &str,
        settings: &BTreeMap<String, String>,
    ) -> Result<()>;
}

/// Push a zip package into the instance's site.
#[allow(async_fn_in_trait)]
pub trait ZipDeployer {
    async fn deploy_zip(&self, instance: &InstanceName, zip: &Path) -> Result<()>;
}

/// Generate resource names unlikely to collide.
pub trait ResourceNamer {
    /// `prefix` followed by random characters, at most `max_len` long.
    fn random_name(&self, prefix: &str, max_len: usize) -> String;
}

/// Composite trait: everything the provisioning pipeline needs from Azure.
pub trait AzureManagement:
    ResourceGroups + Deployments + AppSettings + ZipDeployer + ResourceNamer
{
}

/// Blanket implementation: any type implementing all sub-traits is an `AzureManagement`.
impl<T> AzureManagement for T where
    T: ResourceGroups + Deployments + AppSettings + ZipDeployer + ResourceNamer
{
}

// ── Work-tracking Port ────────────────────────────────────────────────────────

/// Service hook subscriptions of the work-tracking organization.
#[allow(async_fn_in_trait)]
pub trait ServiceHooks {
    async fn list_subscriptions(&self) -> Result<Vec<HookSubscription>>;
    async fn delete_subscription(&self, id: &str) -> Result<()>;
}

// ── Credential Ports ──────────────────────────────────────────────────────────

/// Persistent cache of logon data, one entry per provider.
pub trait CredentialStore {
    /// Load and classify the cached entry. Never touches the network.
    ///
    /// # Errors
    ///
    /// Returns an error only if the cache exists but cannot be read.
    fn load<T: LogonData>(&self) -> Result<LogonOutcome<T>>;
    /// Overwrite the cached entry for `T`'s provider, returning its location.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be written.
    fn save<T: LogonData>(&self, data: &T) -> Result<PathBuf>;
}

/// Exchanges cached logon data for live connections.
///
/// Rejected credentials yield `Ok(None)`; `Err` is reserved for transport
/// failures.
#[allow(async_fn_in_trait)]
pub trait Connector {
    type Azure;
    type Vsts;

    async fn connect_azure(&self, logon: &AzureLogon) -> Result<Option<Self::Azure>>;
    async fn connect_vsts(&self, logon: &VstsLogon) -> Result<Option<Self::Vsts>>;
}

// ── Runtime Package Ports ─────────────────────────────────────────────────────

/// Published releases of the runtime package.
#[allow(async_fn_in_trait)]
pub trait ReleaseSource {
    /// List releases carrying the runtime asset, newest first.
    async fn releases(&self) -> Result<Vec<RuntimePackageRef>>;
    /// Fetch the bytes at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Local cache of downloaded runtime packages, keyed by version.
pub trait PackageCache {
    /// Look up a cached version.
    fn lookup(&self, version: &str) -> Result<Option<CachedPackage>>;
    /// The highest cached version, if any.
    fn latest(&self) -> Result<Option<CachedPackage>>;
    /// Store package bytes under `version`.
    fn store(&self, version: &str, bytes: &[u8]) -> Result<CachedPackage>;
}

// ── Asset and Config Ports ────────────────────────────────────────────────────

/// Source of the instance infrastructure template.
pub trait TemplateSource {
    fn instance_template(&self) -> Result<String>;
}

/// Abstracts CLI configuration loading.
pub trait ConfigStore {
    /// Load the configuration, returning defaults when no file exists.
    fn load(&self) -> Result<CliConfig>;
    /// Location of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}

//! Domain types for the aggregator CLI configuration.
//!
//! Pure functions only, no I/O.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

/// Top-level configuration stored in `~/.aggregator/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CliConfig {
    pub logon: LogonConfig,
    pub deployment: DeploymentConfig,
    pub runtime: RuntimeConfig,
}

/// Credential cache settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogonConfig {
    /// Hours a cached credential stays valid.
    pub validity_hours: u32,
}

impl Default for LogonConfig {
    fn default() -> Self {
        Self { validity_hours: 2 }
    }
}

impl LogonConfig {
    #[must_use]
    pub fn validity(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.validity_hours))
    }
}

/// Template deployment settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DeploymentConfig {
    /// Fixed delay between two deployment status refreshes.
    pub poll_interval_secs: u64,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 3,
        }
    }
}

impl DeploymentConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Where the Function runtime package is published.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RuntimeConfig {
    pub repo_owner: String,
    pub repo_name: String,
    pub asset_name: String,
    /// Semver requirement a release must satisfy to be used.
    pub version_req: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            repo_owner: "tfsaggregator".to_string(),
            repo_name: "aggregator-cli".to_string(),
            asset_name: "FunctionRuntime.zip".to_string(),
            version_req: "*".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Parse [`RuntimeConfig::version_req`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the requirement is not valid semver.
    pub fn version_requirement(&self) -> Result<semver::VersionReq, ConfigError> {
        semver::VersionReq::parse(&self.version_req).map_err(|e| ConfigError::InvalidValue {
            key: "runtime.version_req".to_string(),
            value: self.version_req.clone(),
            reason: e.to_string(),
        })
    }
}

//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod configuration;
pub mod deployment;
pub mod error;
pub mod instance;
pub mod logon;
pub mod runtime;

pub use config::CliConfig;
pub use configuration::AggregatorConfiguration;
pub use deployment::{DeploymentRun, ProvisioningState};
pub use error::{ConfigError, ConfigurationError, InstanceNameError, SessionError};
pub use instance::InstanceName;
pub use logon::{AzureLogon, LogonData, LogonOutcome, Provider, VstsLogon, VstsTokenType};
pub use runtime::{CachedPackage, RuntimePackageRef};

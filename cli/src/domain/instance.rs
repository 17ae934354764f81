//! Instance naming: every Azure identifier of an instance is derived from
//! its plain name.
//!
//! Pure functions only, no I/O.

use std::fmt;

use crate::domain::error::InstanceNameError;

/// Prefix carried by every resource group that hosts an instance.
pub const RESOURCE_GROUP_PREFIX: &str = "aggregator-";

/// Suffix appended to the plain name to form the Function App name.
pub const FUNCTION_APP_SUFFIX: &str = "aggregator";

/// DNS zone of Azure App Service hosts.
pub const APP_SERVICE_DOMAIN: &str = "azurewebsites.net";

/// Longest accepted plain name: App Service names are capped at 60
/// characters and the suffix takes the rest.
pub const MAX_NAME_LEN: usize = 60 - FUNCTION_APP_SUFFIX.len();

/// Logical handle of one deployed instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceName {
    name: String,
}

impl InstanceName {
    /// Validate a plain instance name.
    ///
    /// Accepted names are 2–52 characters of lowercase ASCII letters, digits
    /// and hyphens, starting and ending with a letter or digit.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceNameError::Invalid`] when the name does not match.
    pub fn new(name: &str) -> Result<Self, InstanceNameError> {
        validate_plain_name(name)?;
        Ok(Self {
            name: name.to_string(),
        })
    }

    /// Recover the instance from the name of its resource group.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceNameError::NotAnInstance`] when the resource group
    /// lacks the instance prefix, or [`InstanceNameError::Invalid`] when the
    /// remainder is not a valid plain name.
    pub fn from_resource_group_name(rg_name: &str) -> Result<Self, InstanceNameError> {
        let plain = rg_name
            .strip_prefix(RESOURCE_GROUP_PREFIX)
            .ok_or_else(|| InstanceNameError::NotAnInstance(rg_name.to_string()))?;
        Self::new(plain)
    }

    /// Returns `true` when `rg_name` looks like an instance resource group.
    #[must_use]
    pub fn is_instance_resource_group(rg_name: &str) -> bool {
        rg_name.starts_with(RESOURCE_GROUP_PREFIX)
    }

    #[must_use]
    pub fn plain_name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn resource_group_name(&self) -> String {
        format!("{RESOURCE_GROUP_PREFIX}{}", self.name)
    }

    #[must_use]
    pub fn function_app_name(&self) -> String {
        format!("{}{FUNCTION_APP_SUFFIX}", self.name)
    }

    #[must_use]
    pub fn dns_host_name(&self) -> String {
        format!("{}.{APP_SERVICE_DOMAIN}", self.function_app_name())
    }

    /// Host of the Kudu (SCM) site used for zip deployment.
    #[must_use]
    pub fn scm_host_name(&self) -> String {
        format!("{}.scm.{APP_SERVICE_DOMAIN}", self.function_app_name())
    }
}

impl fmt::Display for InstanceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn validate_plain_name(name: &str) -> Result<(), InstanceNameError> {
    let invalid = || InstanceNameError::Invalid(name.to_string());
    if name.len() < 2 || name.len() > MAX_NAME_LEN {
        return Err(invalid());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(invalid());
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(invalid());
    }
    Ok(())
}

//! Settings pushed into a running instance.
//!
//! Pure functions only, no I/O.

use std::collections::BTreeMap;

use crate::domain::error::ConfigurationError;
use crate::domain::logon::{VstsLogon, VstsTokenType};

/// App setting holding the token kind.
pub const TOKEN_TYPE_SETTING: &str = "Aggregator_VstsTokenType";
/// App setting holding the token itself.
pub const TOKEN_SETTING: &str = "Aggregator_VstsToken";

/// The only token kind an instance can currently run with.
pub const SUPPORTED_TOKEN_TYPE: VstsTokenType = VstsTokenType::Pat;

/// Aggregator settings of one instance.
#[derive(Clone, PartialEq, Eq)]
pub struct AggregatorConfiguration {
    pub token_type: VstsTokenType,
    pub token: String,
    /// Other settings written alongside the token.
    pub additional: BTreeMap<String, String>,
}

impl std::fmt::Debug for AggregatorConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregatorConfiguration")
            .field("token_type", &self.token_type)
            .field("token", &"<redacted>")
            .field("additional", &self.additional)
            .finish()
    }
}

impl AggregatorConfiguration {
    /// Build the configuration for a cached VSTS logon.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnsupportedTokenType`] when the logon
    /// uses a token kind other than [`SUPPORTED_TOKEN_TYPE`].
    pub fn from_logon(logon: &VstsLogon) -> Result<Self, ConfigurationError> {
        if logon.mode != SUPPORTED_TOKEN_TYPE {
            return Err(ConfigurationError::UnsupportedTokenType(logon.mode));
        }
        Ok(Self {
            token_type: logon.mode,
            token: logon.token.clone(),
            additional: BTreeMap::new(),
        })
    }

    /// Merge this configuration over the instance's current app settings.
    ///
    /// Settings not owned by the aggregator are preserved, so applying the
    /// same configuration twice yields the same result.
    #[must_use]
    pub fn apply_to(&self, current: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut merged = current.clone();
        merged.insert(TOKEN_TYPE_SETTING.to_string(), self.token_type.to_string());
        merged.insert(TOKEN_SETTING.to_string(), self.token.clone());
        for (key, value) in &self.additional {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

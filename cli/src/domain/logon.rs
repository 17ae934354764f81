//! Cached logon data for the two providers and its classification.
//!
//! Pure functions only, no I/O.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The external services that require an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Azure Resource Manager.
    Azure,
    /// Azure DevOps (VSTS).
    Vsts,
}

impl Provider {
    /// Name shown to the operator.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Azure => "Azure",
            Self::Vsts => "VSTS",
        }
    }

    /// The command that (re)creates the cached credential.
    #[must_use]
    pub fn logon_command(self) -> &'static str {
        match self {
            Self::Azure => "logon.azure",
            Self::Vsts => "logon.vsts",
        }
    }

    /// Key used by the credential cache.
    #[must_use]
    pub fn cache_key(self) -> &'static str {
        match self {
            Self::Azure => "azure",
            Self::Vsts => "vsts",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Result of loading a cached credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogonOutcome<T> {
    /// A cached credential exists and has not expired.
    Succeeded(T),
    /// Nothing cached for the provider.
    NoCachedCredential,
    /// A credential is cached but past its expiry.
    Expired,
}

impl<T> LogonOutcome<T> {
    /// Returns the credential if the outcome is `Succeeded`.
    pub fn succeeded(self) -> Option<T> {
        match self {
            Self::Succeeded(data) => Some(data),
            Self::NoCachedCredential | Self::Expired => None,
        }
    }
}

/// Authentication material for one provider.
pub trait LogonData: Serialize + DeserializeOwned + Clone {
    /// Which provider this material authenticates against.
    const PROVIDER: Provider;
}

/// Azure service principal credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureLogon {
    pub subscription_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
}

impl LogonData for AzureLogon {
    const PROVIDER: Provider = Provider::Azure;
}

impl fmt::Debug for AzureLogon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureLogon")
            .field("subscription_id", &self.subscription_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

/// Kind of token used to reach Azure DevOps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VstsTokenType {
    /// Personal Access Token.
    #[serde(rename = "PAT")]
    Pat,
    /// OAuth bearer token.
    OAuth,
    /// Windows integrated authentication.
    Integrated,
}

impl fmt::Display for VstsTokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pat => "PAT",
            Self::OAuth => "OAuth",
            Self::Integrated => "Integrated",
        })
    }
}

/// Azure DevOps credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VstsLogon {
    /// Organization URL, e.g. `https://dev.azure.com/contoso`.
    pub url: String,
    pub mode: VstsTokenType,
    pub token: String,
}

impl LogonData for VstsLogon {
    const PROVIDER: Provider = Provider::Vsts;
}

impl fmt::Debug for VstsLogon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VstsLogon")
            .field("url", &self.url)
            .field("mode", &self.mode)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// On-disk envelope of a cached credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedLogon<T> {
    pub provider: Provider,
    pub saved_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub data: T,
}

impl<T: LogonData> CachedLogon<T> {
    /// Wrap freshly acquired material with its validity window.
    #[must_use]
    pub fn new(data: T, now: DateTime<Utc>, validity: Duration) -> Self {
        Self {
            provider: T::PROVIDER,
            saved_at: now,
            expires_at: now + validity,
            data,
        }
    }

    /// Classify the cached entry at `now`.
    ///
    /// An entry recorded for another provider is treated as absent.
    #[must_use]
    pub fn classify(self, now: DateTime<Utc>) -> LogonOutcome<T> {
        if self.provider != T::PROVIDER {
            return LogonOutcome::NoCachedCredential;
        }
        if now >= self.expires_at {
            return LogonOutcome::Expired;
        }
        LogonOutcome::Succeeded(self.data)
    }
}

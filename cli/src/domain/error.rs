//! Typed domain error enums.
//!
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

use crate::domain::logon::{Provider, VstsTokenType};

// ── Instance naming errors ────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InstanceNameError {
    #[error(
        "Invalid instance name '{0}': use 2 to 52 lowercase letters, digits or hyphens, not starting or ending with a hyphen"
    )]
    Invalid(String),

    #[error("Resource group '{0}' does not host an Aggregator instance")]
    NotAnInstance(String),
}

// ── Session errors ────────────────────────────────────────────────────────────

/// Failure to build an authenticated session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No cached {provider} credential: use the {} command.", .provider.logon_command())]
    NoCachedCredential { provider: Provider },

    #[error("Cached {provider} credential expired: use the {} command.", .provider.logon_command())]
    Expired { provider: Provider },

    #[error("Invalid {provider} credential: use the {} command.", .provider.logon_command())]
    LogonFailed { provider: Provider },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SessionError {
    /// The provider the failure relates to, if any.
    #[must_use]
    pub fn provider(&self) -> Option<Provider> {
        match self {
            Self::NoCachedCredential { provider }
            | Self::Expired { provider }
            | Self::LogonFailed { provider } => Some(*provider),
            Self::Other(_) => None,
        }
    }
}

// ── Configuration errors ──────────────────────────────────────────────────────

/// Errors writing settings into an instance.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("VSTS token type {0} is unsupported")]
    UnsupportedTokenType(VstsTokenType),
}

// ── CLI config errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

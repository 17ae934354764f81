//! Application service: authenticated session construction.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use crate::application::ports::{Connector, CredentialStore, Logger};
use crate::domain::{LogonData, LogonOutcome, Provider, SessionError};

/// Which providers a command needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub azure: bool,
    pub vsts: bool,
}

impl SessionConfig {
    /// A session with no provider connection.
    pub const NONE: Self = Self {
        azure: false,
        vsts: false,
    };

    #[must_use]
    pub fn with_azure(self) -> Self {
        Self {
            azure: true,
            ..self
        }
    }

    #[must_use]
    pub fn with_vsts(self) -> Self {
        Self {
            vsts: true,
            ..self
        }
    }
}

/// Live handles for one command invocation.
///
/// Each handle is present iff it was requested and its logon succeeded.
pub struct Session<'a, A, V> {
    pub logger: &'a dyn Logger,
    pub azure: Option<A>,
    pub vsts: Option<V>,
}

impl<A, V> Session<'_, A, V> {
    /// The Azure handle; `build` guarantees it when requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the session was built without Azure.
    pub fn azure(&self) -> anyhow::Result<&A> {
        self.azure
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("session was built without an Azure logon"))
    }

    /// The VSTS handle; `build` guarantees it when requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the session was built without VSTS.
    pub fn vsts(&self) -> anyhow::Result<&V> {
        self.vsts
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("session was built without a VSTS logon"))
    }
}

/// Build a session with every provider requested in `config`.
///
/// Providers are resolved in order (Azure, then VSTS). The first provider
/// whose cached credential is missing, expired or rejected by the live logon
/// fails the whole build; no partial session is returned.
///
/// # Errors
///
/// Returns a [`SessionError`] naming the provider and its logon command.
pub async fn build<'a, C: Connector>(
    config: SessionConfig,
    store: &impl CredentialStore,
    connector: &C,
    logger: &'a dyn Logger,
) -> Result<Session<'a, C::Azure, C::Vsts>, SessionError> {
    let azure = if config.azure {
        logger.info("Authenticating to Azure...");
        let logon = load_cached(store)?;
        let connection = connector.connect_azure(&logon).await?;
        Some(connection.ok_or(SessionError::LogonFailed {
            provider: Provider::Azure,
        })?)
    } else {
        None
    };

    let vsts = if config.vsts {
        logger.info("Authenticating to VSTS...");
        let logon = load_cached(store)?;
        let connection = connector.connect_vsts(&logon).await?;
        Some(connection.ok_or(SessionError::LogonFailed {
            provider: Provider::Vsts,
        })?)
    } else {
        None
    };

    Ok(Session {
        logger,
        azure,
        vsts,
    })
}

/// Load a cached credential, translating absent/expired into session errors.
///
/// # Errors
///
/// Returns [`SessionError::NoCachedCredential`] or [`SessionError::Expired`],
/// or [`SessionError::Other`] if the cache cannot be read.
pub fn load_cached<T: LogonData>(store: &impl CredentialStore) -> Result<T, SessionError> {
    match store.load::<T>()? {
        LogonOutcome::Succeeded(data) => Ok(data),
        LogonOutcome::NoCachedCredential => Err(SessionError::NoCachedCredential {
            provider: T::PROVIDER,
        }),
        LogonOutcome::Expired => Err(SessionError::Expired {
            provider: T::PROVIDER,
        }),
    }
}

//! Application service: `logon.*` use-cases.
//!
//! The credential is cached first, then verified with a live logon so the
//! operator learns immediately whether it works.

use anyhow::Result;

use crate::application::ports::{Connector, CredentialStore, Logger};
use crate::domain::{AzureLogon, VstsLogon};

/// Result of a `logon.*` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogonVerdict {
    /// Cached and accepted by the provider.
    Valid,
    /// Cached, but the provider rejected it.
    Rejected,
}

/// Cache an Azure service principal and verify it.
///
/// # Errors
///
/// Returns an error if the cache cannot be written or the logon exchange
/// fails for reasons other than rejected credentials.
pub async fn logon_azure<C: Connector>(
    store: &impl CredentialStore,
    connector: &C,
    logger: &(impl Logger + ?Sized),
    data: &AzureLogon,
) -> Result<LogonVerdict> {
    let path = store.save(data)?;
    logger.verbose(&format!("Azure credential cached in {}", path.display()));
    logger.info("Connecting to Azure...");
    Ok(match connector.connect_azure(data).await? {
        Some(_) => {
            logger.info("Azure logon succeeded");
            LogonVerdict::Valid
        }
        None => {
            logger.error("Invalid Azure credentials");
            LogonVerdict::Rejected
        }
    })
}

/// Cache a VSTS token and verify it.
///
/// # Errors
///
/// Returns an error if the cache cannot be written or the logon exchange
/// fails for reasons other than rejected credentials.
pub async fn logon_vsts<C: Connector>(
    store: &impl CredentialStore,
    connector: &C,
    logger: &(impl Logger + ?Sized),
    data: &VstsLogon,
) -> Result<LogonVerdict> {
    let path = store.save(data)?;
    logger.verbose(&format!("VSTS credential cached in {}", path.display()));
    logger.info(&format!("Connecting to VSTS using {} credential...", data.mode));
    Ok(match connector.connect_vsts(data).await? {
        Some(_) => {
            logger.info("VSTS logon succeeded");
            LogonVerdict::Valid
        }
        None => {
            logger.error("Invalid VSTS credentials");
            LogonVerdict::Rejected
        }
    })
}

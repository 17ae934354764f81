//! Turns cached logon data into live Azure and Azure DevOps clients.

use std::time::Duration;

use anyhow::Result;

use crate::application::ports::Connector;
use crate::domain::{AzureLogon, VstsLogon};
use crate::infra::azure::{self, AzureClient, LOGIN_ENDPOINT};
use crate::infra::vsts::VstsClient;

const HTTP_TIMEOUT: Duration = Duration::from_secs(300);

/// [`Connector`] backed by the Azure and Azure DevOps REST APIs.
pub struct RestConnector {
    agent: ureq::Agent,
}

impl RestConnector {
    #[must_use]
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("aggregator-cli/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }
}

impl Default for RestConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for RestConnector {
    type Azure = AzureClient;
    type Vsts = VstsClient;

    async fn connect_azure(&self, logon: &AzureLogon) -> Result<Option<AzureClient>> {
        let Some(token) = azure::acquire_token(&self.agent, LOGIN_ENDPOINT, logon).await? else {
            return Ok(None);
        };
        let client = AzureClient::new(self.agent.clone(), logon, &token);
        Ok(client.probe().await?.then_some(client))
    }

    async fn connect_vsts(&self, logon: &VstsLogon) -> Result<Option<VstsClient>> {
        let client = VstsClient::new(self.agent.clone(), logon)?;
        Ok(client.probe().await?.then_some(client))
    }
}

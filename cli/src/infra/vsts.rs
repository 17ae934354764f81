//! Azure DevOps (VSTS) REST adapter.

use anyhow::{Result, bail};

use crate::application::ports::{HookSubscription, ServiceHooks};
use crate::domain::{VstsLogon, VstsTokenType};
use crate::infra::http::{self, Body};

const API_VERSION: &str = "5.0";

/// An authenticated connection to one Azure DevOps organization.
pub struct VstsClient {
    agent: ureq::Agent,
    base_url: String,
    authorization: String,
}

impl VstsClient {
    /// Build a client for `logon`. Integrated authentication is not
    /// available over REST.
    ///
    /// # Errors
    ///
    /// Returns an error for [`VstsTokenType::Integrated`].
    pub fn new(agent: ureq::Agent, logon: &VstsLogon) -> Result<Self> {
        let authorization = match logon.mode {
            VstsTokenType::Pat => http::basic_auth("", &logon.token),
            VstsTokenType::OAuth => format!("Bearer {}", logon.token),
            VstsTokenType::Integrated => {
                bail!("Integrated authentication is not supported; use a PAT")
            }
        };
        Ok(Self {
            agent,
            base_url: logon.url.trim_end_matches('/').to_string(),
            authorization,
        })
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let url = format!("{}/_apis/{path}", self.base_url);
        self.agent
            .request(method, &url)
            .set("Authorization", &self.authorization)
            .set("Accept", "application/json")
            .query("api-version", API_VERSION)
    }

    /// Check the credential against the organization.
    ///
    /// Azure DevOps answers a bad PAT with 401, 403 or a 203 sign-in page.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failures or unexpected statuses.
    pub async fn probe(&self) -> Result<bool> {
        let resp = http::send(self.request("GET", "connectionData"), Body::Empty).await?;
        match resp.status {
            203 | 401 | 403 => Ok(false),
            _ => resp
                .error_for_status("connecting to Azure DevOps")
                .map(|_| true),
        }
    }
}

fn parse_subscriptions(value: &serde_json::Value) -> Vec<HookSubscription> {
    value
        .get("value")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|s| {
                    Some(HookSubscription {
                        id: s.get("id")?.as_str()?.to_string(),
                        event_type: s
                            .get("eventType")
                            .and_then(|v| v.as_str())
                            .unwrap_or_default()
                            .to_string(),
                        target_url: s
                            .pointer("/consumerInputs/url")
                            .and_then(|v| v.as_str())
                            .map(str::to_string),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

impl ServiceHooks for VstsClient {
    async fn list_subscriptions(&self) -> Result<Vec<HookSubscription>> {
        let value = http::send(self.request("GET", "hooks/subscriptions"), Body::Empty)
            .await?
            .error_for_status("listing service hooks")?
            .json()?;
        Ok(parse_subscriptions(&value))
    }

    async fn delete_subscription(&self, id: &str) -> Result<()> {
        let resp = http::send(
            self.request("DELETE", &format!("hooks/subscriptions/{id}")),
            Body::Empty,
        )
        .await?;
        if resp.status == 404 {
            return Ok(());
        }
        resp.error_for_status("deleting service hook")?;
        Ok(())
    }
}

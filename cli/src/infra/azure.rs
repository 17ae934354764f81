//! Azure Resource Manager adapter.
//!
//! Talks to the ARM REST API with a client-credentials bearer token. The
//! token is re-acquired once when ARM answers 401, so long deployment polls
//! outlive the token lifetime. Zip deployment goes to the site's Kudu
//! endpoint using the site's publishing credentials.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::json;

use crate::application::ports::{
    AppSettings, DeploymentRequest, Deployments, ResourceGroupInfo, ResourceGroups,
    ResourceNamer, ZipDeployer,
};
use crate::domain::{AzureLogon, InstanceName};
use crate::infra::http::{self, Body, Response};

/// Public-cloud ARM endpoint.
pub const ARM_ENDPOINT: &str = "https://management.azure.com";
/// Microsoft identity platform endpoint.
pub const LOGIN_ENDPOINT: &str = "https://login.microsoftonline.com";
const ARM_SCOPE: &str = "https://management.azure.com/.default";
const RESOURCES_API_VERSION: &str = "2021-04-01";
const WEB_API_VERSION: &str = "2022-03-01";
const DELETE_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Client-credentials grant for ARM. `Ok(None)` when the principal is
/// rejected.
///
/// # Errors
///
/// Returns an error on transport failures or a malformed token response.
pub async fn acquire_token(
    agent: &ureq::Agent,
    login_endpoint: &str,
    logon: &AzureLogon,
) -> Result<Option<String>> {
    let url = format!("{login_endpoint}/{}/oauth2/v2.0/token", logon.tenant_id);
    let form = vec![
        ("grant_type", "client_credentials".to_string()),
        ("client_id", logon.client_id.clone()),
        ("client_secret", logon.client_secret.clone()),
        ("scope", ARM_SCOPE.to_string()),
    ];
    let resp = http::send(agent.post(&url), Body::Form(form)).await?;
    if matches!(resp.status, 400 | 401) {
        return Ok(None);
    }
    let value = resp.error_for_status("acquiring Azure token")?.json()?;
    value
        .get("access_token")
        .and_then(|v| v.as_str())
        .map(|t| Some(t.to_string()))
        .context("token response has no access_token")
}

/// An authenticated ARM session bound to one subscription.
pub struct AzureClient {
    agent: ureq::Agent,
    endpoint: String,
    login_endpoint: String,
    logon: AzureLogon,
    bearer: Mutex<String>,
}

impl AzureClient {
    #[must_use]
    pub fn new(agent: ureq::Agent, logon: &AzureLogon, access_token: &str) -> Self {
        Self {
            agent,
            endpoint: ARM_ENDPOINT.to_string(),
            login_endpoint: LOGIN_ENDPOINT.to_string(),
            logon: logon.clone(),
            bearer: Mutex::new(format!("Bearer {access_token}")),
        }
    }

    #[cfg(test)]
    fn with_endpoints(mut self, arm: &str, login: &str) -> Self {
        self.endpoint = arm.to_string();
        self.login_endpoint = login.to_string();
        self
    }

    fn bearer(&self) -> String {
        match self.bearer.lock() {
            Ok(bearer) => bearer.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_bearer(&self, token: &str) {
        let value = format!("Bearer {token}");
        match self.bearer.lock() {
            Ok(mut bearer) => *bearer = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }

    fn subscription_url(&self) -> String {
        format!("{}/subscriptions/{}", self.endpoint, self.logon.subscription_id)
    }

    fn group_url(&self, resource_group: &str) -> String {
        format!("{}/resourcegroups/{resource_group}", self.subscription_url())
    }

    fn site_url(&self, resource_group: &str, app_name: &str) -> String {
        format!(
            "{}/providers/Microsoft.Web/sites/{app_name}",
            self.group_url(resource_group)
        )
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        self.agent
            .request(method, url)
            .set("Authorization", &self.bearer())
            .set("Accept", "application/json")
    }

    /// Send an ARM request, re-acquiring the token once on 401.
    async fn call(&self, method: &str, url: &str, body: Body) -> Result<Response> {
        let resp = http::send(self.request(method, url), body.clone()).await?;
        if resp.status != 401 {
            return Ok(resp);
        }
        let Some(token) = acquire_token(&self.agent, &self.login_endpoint, &self.logon).await?
        else {
            return Ok(resp);
        };
        self.set_bearer(&token);
        http::send(self.request(method, url), body).await
    }

    /// Probe the subscription. `Ok(false)` when the token cannot see it.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failures or unexpected statuses.
    pub async fn probe(&self) -> Result<bool> {
        let url = format!(
            "{}?api-version={RESOURCES_API_VERSION}",
            self.subscription_url()
        );
        let resp = http::send(self.request("GET", &url), Body::Empty).await?;
        match resp.status {
            401 | 403 | 404 => Ok(false),
            _ => resp.error_for_status("reading subscription").map(|_| true),
        }
    }

    async fn publishing_credentials(
        &self,
        resource_group: &str,
        app_name: &str,
    ) -> Result<(String, String)> {
        let url = format!(
            "{}/config/publishingcredentials/list?api-version={WEB_API_VERSION}",
            self.site_url(resource_group, app_name)
        );
        let resp = self
            .call("POST", &url, Body::Empty)
            .await?
            .error_for_status("reading publishing credentials")?;
        let value = resp.json()?;
        let field = |name: &str| {
            value
                .pointer(&format!("/properties/{name}"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .with_context(|| format!("publishing credentials lack {name}"))
        };
        Ok((field("publishingUserName")?, field("publishingPassword")?))
    }
}

fn parse_groups(value: &serde_json::Value) -> Vec<ResourceGroupInfo> {
    value
        .get("value")
        .and_then(|v| v.as_array())
        .map(|groups| {
            groups
                .iter()
                .filter_map(|g| {
                    Some(ResourceGroupInfo {
                        name: g.get("name")?.as_str()?.to_string(),
                        location: g.get("location")?.as_str()?.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

impl ResourceGroups for AzureClient {
    async fn list(&self) -> Result<Vec<ResourceGroupInfo>> {
        let mut groups = Vec::new();
        let mut next = Some(format!(
            "{}/resourcegroups?api-version={RESOURCES_API_VERSION}",
            self.subscription_url()
        ));
        while let Some(url) = next {
            let value = self
                .call("GET", &url, Body::Empty)
                .await?
                .error_for_status("listing resource groups")?
                .json()?;
            groups.extend(parse_groups(&value));
            next = value
                .get("nextLink")
                .and_then(|v| v.as_str())
                .map(str::to_string);
        }
        Ok(groups)
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        let url = format!(
            "{}?api-version={RESOURCES_API_VERSION}",
            self.group_url(name)
        );
        let resp = self.call("HEAD", &url, Body::Empty).await?;
        match resp.status {
            404 => Ok(false),
            _ => resp
                .error_for_status("checking resource group")
                .map(|_| true),
        }
    }

    async fn create(&self, name: &str, location: &str) -> Result<()> {
        let url = format!(
            "{}?api-version={RESOURCES_API_VERSION}",
            self.group_url(name)
        );
        self.call("PUT", &url, Body::Json(json!({ "location": location })))
            .await?
            .error_for_status("creating resource group")?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let url = format!(
            "{}?api-version={RESOURCES_API_VERSION}",
            self.group_url(name)
        );
        let resp = self.call("DELETE", &url, Body::Empty).await?;
        if resp.status == 404 {
            return Ok(());
        }
        let resp = resp.error_for_status("deleting resource group")?;
        if resp.status != 202 {
            return Ok(());
        }
        let Some(mut poll_url) = resp.location else {
            return Ok(());
        };
        loop {
            tokio::time::sleep(DELETE_POLL_INTERVAL).await;
            let resp = self
                .call("GET", &poll_url, Body::Empty)
                .await?
                .error_for_status("waiting for resource group deletion")?;
            if resp.status != 202 {
                return Ok(());
            }
            if let Some(location) = resp.location {
                poll_url = location;
            }
        }
    }
}

impl Deployments for AzureClient {
    async fn submit(&self, request: &DeploymentRequest<'_>) -> Result<()> {
        let template: serde_json::Value =
            serde_json::from_str(request.template).context("parsing instance template")?;
        let url = format!(
            "{}/providers/Microsoft.Resources/deployments/{}?api-version={RESOURCES_API_VERSION}",
            self.group_url(request.resource_group),
            request.name
        );
        let body = json!({
            "properties": {
                "mode": "Incremental",
                "template": template,
                "parameters": request.parameters,
            }
        });
        self.call("PUT", &url, Body::Json(body))
            .await?
            .error_for_status("submitting deployment")?;
        Ok(())
    }

    async fn refresh(&self, resource_group: &str, name: &str) -> Result<String> {
        let url = format!(
            "{}/providers/Microsoft.Resources/deployments/{name}?api-version={RESOURCES_API_VERSION}",
            self.group_url(resource_group)
        );
        let value = self
            .call("GET", &url, Body::Empty)
            .await?
            .error_for_status("reading deployment")?
            .json()?;
        value
            .pointer("/properties/provisioningState")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .context("deployment has no provisioningState")
    }
}

impl AppSettings for AzureClient {
    async fn read_settings(
        &self,
        resource_group: &str,
        app_name: &str,
    ) -> Result<BTreeMap<String, String>> {
        let url = format!(
            "{}/config/appsettings/list?api-version={WEB_API_VERSION}",
            self.site_url(resource_group, app_name)
        );
        let value = self
            .call("POST", &url, Body::Empty)
            .await?
            .error_for_status("reading app settings")?
            .json()?;
        let settings = value
            .get("properties")
            .and_then(|p| p.as_object())
            .map(|props| {
                props
                    .iter()
                    .filter_map(|(k, v)| Some((k.clone(), v.as_str()?.to_string())))
                    .collect()
            })
            .unwrap_or_default();
        Ok(settings)
    }

    async fn write_settings(
        &self,
        resource_group: &str,
        app_name: &str,
        settings: &BTreeMap<String, String>,
    ) -> Result<()> {
        let url = format!(
            "{}/config/appsettings?api-version={WEB_API_VERSION}",
            self.site_url(resource_group, app_name)
        );
        self.call("PUT", &url, Body::Json(json!({ "properties": settings })))
            .await?
            .error_for_status("writing app settings")?;
        Ok(())
    }
}

impl ZipDeployer for AzureClient {
    async fn deploy_zip(&self, instance: &InstanceName, zip: &Path) -> Result<()> {
        let (user, password) = self
            .publishing_credentials(&instance.resource_group_name(), &instance.function_app_name())
            .await?;
        let bytes = tokio::fs::read(zip)
            .await
            .with_context(|| format!("reading {}", zip.display()))?;
        let url = format!("https://{}/api/zipdeploy", instance.scm_host_name());
        let request = self
            .agent
            .post(&url)
            .set("Authorization", &http::basic_auth(&user, &password));
        http::send(request, Body::Bytes(bytes, "application/zip"))
            .await?
            .error_for_status("uploading runtime package")?;
        Ok(())
    }
}

impl ResourceNamer for AzureClient {
    fn random_name(&self, prefix: &str, max_len: usize) -> String {
        random_name(prefix, max_len)
    }
}

/// `prefix` followed by random lowercase hex, truncated to `max_len`.
///
/// Entropy sources: nanosecond timestamp and `RandomState` hashes.
#[must_use]
pub fn random_name(prefix: &str, max_len: usize) -> String {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let mut name = prefix.to_string();
    while name.len() < max_len {
        let mut hasher = RandomState::new().build_hasher();
        hasher.write_u128(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0),
        );
        hasher.write_u64(RandomState::new().build_hasher().finish());
        name.push_str(&format!("{:016x}", hasher.finish()));
    }
    name.truncate(max_len);
    name
}

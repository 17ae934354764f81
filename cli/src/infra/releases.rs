//! Runtime package releases published on GitHub.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::application::ports::ReleaseSource;
use crate::domain::RuntimePackageRef;
use crate::domain::config::RuntimeConfig;
use crate::infra::http::{self, Body};

const GITHUB_API: &str = "https://api.github.com";

/// [`ReleaseSource`] over the GitHub releases API.
pub struct GithubReleaseSource {
    agent: ureq::Agent,
    releases_url: String,
    asset_name: String,
    token: Option<String>,
}

impl GithubReleaseSource {
    /// `AGGREGATOR_GITHUB_API_URL` replaces the releases URL and
    /// `GITHUB_TOKEN` is sent when set.
    #[must_use]
    pub fn new(config: &RuntimeConfig) -> Self {
        let releases_url = std::env::var("AGGREGATOR_GITHUB_API_URL").unwrap_or_else(|_| {
            format!(
                "{GITHUB_API}/repos/{}/{}/releases?per_page=30",
                config.repo_owner, config.repo_name
            )
        });
        Self {
            agent: ureq::AgentBuilder::new().user_agent("aggregator-cli").build(),
            releases_url,
            asset_name: config.asset_name.clone(),
            token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }

    fn get(&self, url: &str, accept: &str) -> ureq::Request {
        let req = self.agent.get(url).set("Accept", accept);
        match &self.token {
            Some(token) => req.set("Authorization", &format!("Bearer {token}")),
            None => req,
        }
    }
}

/// Releases from a GitHub API response that carry `asset_name`.
fn parse_releases(body: &serde_json::Value, asset_name: &str) -> Vec<RuntimePackageRef> {
    let Some(releases) = body.as_array() else {
        return Vec::new();
    };
    releases
        .iter()
        .filter(|r| !r["draft"].as_bool().unwrap_or(false))
        .filter_map(|r| {
            let tag = r["tag_name"].as_str().filter(|t| !t.is_empty())?;
            let download_url = r["assets"]
                .as_array()?
                .iter()
                .find(|a| a["name"].as_str() == Some(asset_name))?["browser_download_url"]
                .as_str()?;
            Some(RuntimePackageRef {
                version: tag.trim_start_matches('v').to_string(),
                published_at: r["published_at"]
                    .as_str()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|d| d.with_timezone(&Utc)),
                download_url: download_url.to_string(),
            })
        })
        .collect()
}

impl ReleaseSource for GithubReleaseSource {
    async fn releases(&self) -> Result<Vec<RuntimePackageRef>> {
        let resp = http::send(
            self.get(&self.releases_url, "application/vnd.github+json"),
            Body::Empty,
        )
        .await?;
        if resp.status == 403 {
            anyhow::bail!(
                "cannot list runtime releases: rate limited.\n\nTry again in a few minutes, or set GITHUB_TOKEN."
            );
        }
        let body = resp
            .error_for_status("listing runtime releases")?
            .json()
            .context("invalid releases response")?;
        Ok(parse_releases(&body, &self.asset_name))
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let resp = http::send(self.get(url, "application/octet-stream"), Body::Empty)
            .await?
            .error_for_status("downloading runtime package")?;
        Ok(resp.body)
    }
}

//! `logon.azure` / `logon.vsts`: cache a credential and verify it.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, ValueEnum};

use crate::app::AppContext;
use crate::application::services::logon::{self, LogonVerdict};
use crate::domain::{AzureLogon, VstsLogon, VstsTokenType};

/// Exit code when the provider rejects the credential.
const INVALID_CREDENTIAL: u8 = 2;

/// Arguments for `logon.azure`.
#[derive(Args)]
pub struct AzureArgs {
    /// Azure subscription ID
    #[arg(short, long)]
    pub subscription: String,
    /// Service principal client (application) ID
    #[arg(short, long)]
    pub client: String,
    /// Service principal secret
    #[arg(short, long, env = "AGGREGATOR_AZURE_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Azure AD tenant ID
    #[arg(short, long)]
    pub tenant: String,
}

/// `--mode` values accepted by `logon.vsts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogonMode {
    /// Personal Access Token
    #[value(name = "PAT", alias = "pat")]
    Pat,
    /// OAuth bearer token
    #[value(name = "OAuth", alias = "oauth")]
    OAuth,
    /// Windows integrated authentication
    #[value(name = "Integrated", alias = "integrated")]
    Integrated,
}

impl From<LogonMode> for VstsTokenType {
    fn from(mode: LogonMode) -> Self {
        match mode {
            LogonMode::Pat => Self::Pat,
            LogonMode::OAuth => Self::OAuth,
            LogonMode::Integrated => Self::Integrated,
        }
    }
}

/// Arguments for `logon.vsts`.
#[derive(Args)]
pub struct VstsArgs {
    /// Organization URL, e.g. `https://dev.azure.com/contoso`
    #[arg(short, long)]
    pub url: String,
    /// Logon mode
    #[arg(short, long, value_enum)]
    pub mode: LogonMode,
    /// Personal Access Token (or OAuth token)
    #[arg(short, long, env = "AGGREGATOR_VSTS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

fn verdict_code(verdict: LogonVerdict) -> ExitCode {
    match verdict {
        LogonVerdict::Valid => ExitCode::SUCCESS,
        LogonVerdict::Rejected => ExitCode::from(INVALID_CREDENTIAL),
    }
}

/// Run `logon.azure`.
///
/// # Errors
///
/// Returns an error if the credential cannot be cached or Azure is unreachable.
pub async fn azure(app: &AppContext, args: &AzureArgs) -> Result<ExitCode> {
    let data = AzureLogon {
        subscription_id: args.subscription.clone(),
        client_id: args.client.clone(),
        client_secret: args.password.clone(),
        tenant_id: args.tenant.clone(),
    };
    let verdict = logon::logon_azure(
        &app.credential_store(),
        &app.connector(),
        &app.logger(),
        &data,
    )
    .await?;
    Ok(verdict_code(verdict))
}

/// Run `logon.vsts`.
///
/// # Errors
///
/// Returns an error if a token is required but missing, the credential
/// cannot be cached, or Azure DevOps is unreachable.
pub async fn vsts(app: &AppContext, args: &VstsArgs) -> Result<ExitCode> {
    let mode = VstsTokenType::from(args.mode);
    let token = match (&args.token, mode) {
        (Some(token), _) => token.clone(),
        (None, VstsTokenType::Integrated) => String::new(),
        (None, mode) => anyhow::bail!("--token is required for {mode} logon"),
    };
    let data = VstsLogon {
        url: args.url.clone(),
        mode,
        token,
    };
    let verdict = logon::logon_vsts(
        &app.credential_store(),
        &app.connector(),
        &app.logger(),
        &data,
    )
    .await?;
    Ok(verdict_code(verdict))
}

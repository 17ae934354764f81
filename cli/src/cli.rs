//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser, Subcommand};

use crate::app::{AppContext, OutputFlags};
use crate::commands;
use crate::output;

/// Provision and manage Aggregator instances in Azure
#[derive(Parser)]
#[command(
    name = "aggregator-cli",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show detailed progress
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log on to Azure with a service principal
    #[command(name = "logon.azure")]
    LogonAzure(commands::logon::AzureArgs),

    /// Log on to Azure DevOps with a token
    #[command(name = "logon.vsts")]
    LogonVsts(commands::logon::VstsArgs),

    /// List Aggregator instances
    #[command(name = "list.instances")]
    ListInstances(commands::instances::ListArgs),

    /// Create an Aggregator instance in Azure
    #[command(name = "install.instance")]
    InstallInstance(commands::instances::InstallArgs),

    /// Update the configuration of an Aggregator instance
    #[command(name = "configure.instance")]
    ConfigureInstance(commands::instances::ConfigureArgs),

    /// Destroy an Aggregator instance in Azure
    #[command(name = "uninstall.instance")]
    UninstallInstance(commands::instances::UninstallArgs),
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            verbose,
            no_color,
            command,
        } = self;
        let app = AppContext::new(&OutputFlags {
            no_color,
            quiet,
            verbose,
            json,
        })?;

        let result = match command {
            Command::LogonAzure(args) => commands::logon::azure(&app, &args).await,
            Command::LogonVsts(args) => commands::logon::vsts(&app, &args).await,
            Command::ListInstances(args) => commands::instances::list(&app, &args).await,
            Command::InstallInstance(args) => commands::instances::install(&app, &args).await,
            Command::ConfigureInstance(args) => commands::instances::configure(&app, &args).await,
            Command::UninstallInstance(args) => commands::instances::uninstall(&app, &args).await,
        };
        match result {
            Err(e) if json => {
                println!("{}", output::json::format_error(&format!("{e:#}"), 1)?);
                Ok(ExitCode::FAILURE)
            }
            other => other,
        }
    }
}

//! Aggregator CLI - provision and manage Aggregator instances in Azure

#![cfg_attr(test, allow(clippy::expect_used))]

use std::process::ExitCode;

use aggregator_cli::cli::Cli;
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

//! Application context: unified state passed to every command handler.
//!
//! Built once per invocation from the global flags and the configuration
//! file. Adapters are constructed here so command handlers stay thin.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;

use crate::application::ports::ConfigStore;
use crate::application::services::deployment::{Cancellation, PollOptions};
use crate::domain::CliConfig;
use crate::infra::config::{YamlConfigStore, aggregator_home};
use crate::infra::connector::RestConnector;
use crate::infra::credential_store::FileCredentialStore;
use crate::infra::package_cache::DiskPackageCache;
use crate::infra::releases::GithubReleaseSource;
use crate::output::{OutputContext, TerminalLogger};

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Show verbose detail.
    pub verbose: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet, verbose).
    pub output: OutputContext,
    /// Machine-readable output requested.
    pub json: bool,
    /// Loaded configuration.
    pub config: CliConfig,
    /// Aggregator home directory (credential and runtime caches).
    pub home: PathBuf,
    cancel: Arc<watch::Sender<bool>>,
}

/// Exit status of a process interrupted by SIGINT.
const INTERRUPTED: i32 = 130;

/// Hand an interrupt to a running deployment poll.
///
/// Returns `false` when no poll is subscribed; the caller then exits.
fn forward_interrupt(signal: &watch::Sender<bool>) -> bool {
    if signal.receiver_count() == 0 {
        return false;
    }
    signal.send_replace(true);
    true
}

impl AppContext {
    /// Construct an `AppContext` and install the Ctrl-C handler.
    ///
    /// Ctrl-C cancels a deployment poll in progress and terminates the
    /// process otherwise. Must be called from within the Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the
    /// configuration file is invalid.
    pub fn new(flags: &OutputFlags) -> Result<Self> {
        let config = YamlConfigStore.load()?;
        let home = aggregator_home()?;

        let (tx, _) = watch::channel(false);
        let cancel = Arc::new(tx);
        let signal = Arc::clone(&cancel);
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if !forward_interrupt(&signal) {
                    std::process::exit(INTERRUPTED);
                }
            }
        });

        Ok(Self {
            // JSON mode keeps stdout machine-readable.
            output: OutputContext::new(flags.no_color, flags.quiet || flags.json, flags.verbose),
            json: flags.json,
            config,
            home,
            cancel,
        })
    }

    #[must_use]
    pub fn logger(&self) -> TerminalLogger<'_> {
        TerminalLogger::new(&self.output)
    }

    #[must_use]
    pub fn credential_store(&self) -> FileCredentialStore {
        FileCredentialStore::new(self.home.clone(), self.config.logon.validity())
    }

    #[must_use]
    pub fn connector(&self) -> RestConnector {
        RestConnector::new()
    }

    #[must_use]
    pub fn release_source(&self) -> GithubReleaseSource {
        GithubReleaseSource::new(&self.config.runtime)
    }

    #[must_use]
    pub fn package_cache(&self) -> DiskPackageCache {
        DiskPackageCache::new(self.home.join("runtime"), &self.config.runtime.asset_name)
    }

    /// Poll settings wired to Ctrl-C.
    #[must_use]
    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            interval: self.config.deployment.poll_interval(),
            cancel: Cancellation::new(Arc::clone(&self.cancel)),
        }
    }
}

//! Infrastructure implementation of the `ConfigStore` port and the
//! aggregator home directory policy.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::application::ports::ConfigStore;
use crate::domain::config::CliConfig;

/// Resolve the aggregator home directory.
///
/// `AGGREGATOR_HOME` wins; otherwise `~/.aggregator`. Credential cache,
/// runtime cache and configuration all live below it.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn aggregator_home() -> Result<PathBuf> {
    if let Ok(val) = std::env::var("AGGREGATOR_HOME") {
        return Ok(PathBuf::from(val));
    }
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.join(".aggregator"))
}

/// Production implementation of `ConfigStore` that uses a YAML file on disk.
pub struct YamlConfigStore;

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<CliConfig> {
        let path = self.path()?;
        if !path.exists() {
            return Ok(CliConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let config: CliConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", path.display()))?;
        config.runtime.version_requirement()?;
        Ok(config)
    }

    fn path(&self) -> Result<PathBuf> {
        if let Ok(val) = std::env::var("AGGREGATOR_CONFIG") {
            return Ok(PathBuf::from(val));
        }
        Ok(aggregator_home()?.join("config.yaml"))
    }
}

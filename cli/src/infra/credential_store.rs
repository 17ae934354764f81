//! Infrastructure implementation of the `CredentialStore` port.
//!
//! One JSON file per provider (`logon.azure.json`, `logon.vsts.json`) under
//! the aggregator home directory, written atomically (temp file + rename)
//! with owner-only permissions.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use crate::application::ports::CredentialStore;
use crate::domain::logon::{CachedLogon, LogonData, LogonOutcome};

/// File-backed credential cache.
pub struct FileCredentialStore {
    dir: PathBuf,
    validity: chrono::Duration,
}

impl FileCredentialStore {
    /// Create a store rooted at `dir`; saved entries expire after `validity`.
    #[must_use]
    pub fn new(dir: PathBuf, validity: chrono::Duration) -> Self {
        Self { dir, validity }
    }

    /// Path of the cache file for `T`'s provider.
    #[must_use]
    pub fn path_for<T: LogonData>(&self) -> PathBuf {
        self.dir
            .join(format!("logon.{}.json", T::PROVIDER.cache_key()))
    }
}

impl CredentialStore for FileCredentialStore {
    fn load<T: LogonData>(&self) -> Result<LogonOutcome<T>> {
        let path = self.path_for::<T>();
        if !path.exists() {
            return Ok(LogonOutcome::NoCachedCredential);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading credential cache {}", path.display()))?;
        // A file that no longer matches the expected shape is as good as absent.
        let Ok(cached) = serde_json::from_str::<CachedLogon<T>>(&content) else {
            return Ok(LogonOutcome::NoCachedCredential);
        };
        Ok(cached.classify(Utc::now()))
    }

    fn save<T: LogonData>(&self, data: &T) -> Result<PathBuf> {
        let cached = CachedLogon::new(data.clone(), Utc::now(), self.validity);
        let content = serde_json::to_string_pretty(&cached).context("serializing credential")?;
        let path = self.path_for::<T>();
        write_private(&path, &content)?;
        Ok(path)
    }
}

/// Atomic owner-only write.
fn write_private(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, content)
        .with_context(|| format!("writing temp file {}", temp_path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
    }

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("finalizing credential cache {}", path.display()))
}

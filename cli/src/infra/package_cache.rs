//! On-disk cache of downloaded runtime packages.
//!
//! Layout: `<root>/<version>/<asset>` plus a `<asset>.sha256` sidecar holding
//! the hex digest recorded at download time. An entry whose digest no longer
//! matches is treated as missing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::application::ports::PackageCache;
use crate::domain::CachedPackage;

/// [`PackageCache`] rooted at a directory.
pub struct DiskPackageCache {
    root: PathBuf,
    asset_name: String,
}

impl DiskPackageCache {
    #[must_use]
    pub fn new(root: PathBuf, asset_name: &str) -> Self {
        Self {
            root,
            asset_name: asset_name.to_string(),
        }
    }

    fn package_path(&self, version: &str) -> PathBuf {
        self.root.join(version).join(&self.asset_name)
    }
}

fn digest_path(package: &Path) -> PathBuf {
    let mut name = package.as_os_str().to_os_string();
    name.push(".sha256");
    PathBuf::from(name)
}

fn sha256_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for &b in digest.as_slice() {
        out.push(char::from(HEX[(b >> 4) as usize]));
        out.push(char::from(HEX[(b & 0xf) as usize]));
    }
    out
}

/// Write `bytes` to `path` through a temp file in the same directory.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    use std::io::Write as _;

    let dir = path.parent().context("cache path has no parent")?;
    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    temp.write_all(bytes)
        .with_context(|| format!("writing {}", path.display()))?;
    temp.persist(path)
        .with_context(|| format!("finalizing {}", path.display()))?;
    Ok(())
}

impl PackageCache for DiskPackageCache {
    fn lookup(&self, version: &str) -> Result<Option<CachedPackage>> {
        let path = self.package_path(version);
        if !path.is_file() {
            return Ok(None);
        }
        let Ok(expected) = std::fs::read_to_string(digest_path(&path)) else {
            return Ok(None);
        };
        let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        if sha256_hex(&bytes) != expected.trim() {
            return Ok(None);
        }
        Ok(Some(CachedPackage {
            version: version.to_string(),
            path,
        }))
    }

    fn latest(&self) -> Result<Option<CachedPackage>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.root.display()));
            }
        };
        let mut versions: Vec<(semver::Version, String)> = entries
            .filter_map(std::result::Result::ok)
            .filter_map(|e| e.file_name().into_string().ok())
            .filter_map(|name| Some((semver::Version::parse(&name).ok()?, name)))
            .collect();
        versions.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, name) in versions {
            if let Some(found) = self.lookup(&name)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    fn store(&self, version: &str, bytes: &[u8]) -> Result<CachedPackage> {
        let path = self.package_path(version);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating directory {}", dir.display()))?;
        }
        write_atomic(&path, bytes)?;
        write_atomic(&digest_path(&path), sha256_hex(bytes).as_bytes())?;
        Ok(CachedPackage {
            version: version.to_string(),
            path,
        })
    }
}

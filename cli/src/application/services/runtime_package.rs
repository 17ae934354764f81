//! Application service: runtime package resolution, caching and upload.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};
use semver::{Version, VersionReq};

use crate::application::ports::{Logger, PackageCache, ReleaseSource, ZipDeployer};
use crate::domain::{CachedPackage, InstanceName, RuntimePackageRef};

/// Resolves, downloads and uploads the Function runtime package.
pub struct RuntimePackage<'a, R, C> {
    source: &'a R,
    cache: &'a C,
    requirement: VersionReq,
}

impl<'a, R: ReleaseSource, C: PackageCache> RuntimePackage<'a, R, C> {
    #[must_use]
    pub fn new(source: &'a R, cache: &'a C, requirement: VersionReq) -> Self {
        Self {
            source,
            cache,
            requirement,
        }
    }

    /// Find the latest published release compatible with the requirement.
    ///
    /// # Errors
    ///
    /// Returns an error if releases cannot be listed or none is compatible.
    pub async fn find_version(&self) -> Result<RuntimePackageRef> {
        let releases = self
            .source
            .releases()
            .await
            .context("listing runtime releases")?;
        latest_compatible(releases, &self.requirement).ok_or_else(|| {
            anyhow::anyhow!(
                "no runtime release matches version requirement {}",
                self.requirement
            )
        })
    }

    /// Download `package` into the cache unless that version is already there.
    ///
    /// # Errors
    ///
    /// Returns an error if the download or the cache write fails.
    pub async fn download(&self, package: &RuntimePackageRef) -> Result<CachedPackage> {
        if let Some(cached) = self.cache.lookup(&package.version)? {
            return Ok(cached);
        }
        let bytes = self
            .source
            .fetch(&package.download_url)
            .await
            .with_context(|| format!("downloading runtime package {}", package.version))?;
        self.cache
            .store(&package.version, &bytes)
            .with_context(|| format!("caching runtime package {}", package.version))
    }

    /// Resolve and download the latest package, falling back to the newest
    /// cached one when either step fails.
    ///
    /// Returns `None` when nothing could be resolved and nothing is cached.
    pub async fn resolve(&self, logger: &(impl Logger + ?Sized)) -> Option<CachedPackage> {
        logger.verbose("Checking runtime package version");
        let fetched = match self.find_version().await {
            Ok(package) => {
                logger.verbose(&format!("Downloading runtime package {}", package.version));
                self.download(&package).await
            }
            Err(e) => Err(e),
        };
        match fetched {
            Ok(cached) => {
                logger.info(&format!("Runtime package {} downloaded.", cached.version));
                Some(cached)
            }
            Err(e) => {
                logger.warning(&format!("Cannot download runtime package: {e:#}"));
                match self.cache.latest() {
                    Ok(Some(cached)) => {
                        logger.warning(&format!(
                            "Using cached runtime package {}",
                            cached.version
                        ));
                        Some(cached)
                    }
                    Ok(None) => None,
                    Err(e) => {
                        logger.warning(&format!("Cannot read runtime package cache: {e:#}"));
                        None
                    }
                }
            }
        }
    }

    /// Push the cached package into the instance. Returns `true` on success.
    pub async fn upload_runtime_zip(
        &self,
        azure: &impl ZipDeployer,
        instance: &InstanceName,
        package: &CachedPackage,
        logger: &(impl Logger + ?Sized),
    ) -> bool {
        logger.verbose(&format!(
            "Uploading runtime package to {}",
            instance.dns_host_name()
        ));
        match azure.deploy_zip(instance, &package.path).await {
            Ok(()) => {
                logger.info(&format!("Runtime package uploaded to {instance}."));
                true
            }
            Err(e) => {
                logger.error(&format!("Upload of runtime package failed: {e:#}"));
                false
            }
        }
    }
}

/// Pick the highest release whose version satisfies `requirement`.
///
/// Tags that are not valid semver (after stripping a leading `v`) are skipped.
#[must_use]
pub fn latest_compatible(
    releases: Vec<RuntimePackageRef>,
    requirement: &VersionReq,
) -> Option<RuntimePackageRef> {
    releases
        .into_iter()
        .filter_map(|r| {
            let version = Version::parse(r.version.trim_start_matches('v')).ok()?;
            requirement.matches(&version).then_some((version, r))
        })
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, r)| r)
}

//! Runtime package resolution, cache fallback and download reuse.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use aggregator_cli::application::services::runtime_package::RuntimePackage;
use semver::VersionReq;

use crate::fakes::{FakeReleaseSource, Level, MemoryPackageCache, RecordingLogger};

#[tokio::test]
async fn test_resolve_downloads_latest_compatible() {
    let source = FakeReleaseSource::with_versions(&["0.3.9", "0.4.1", "1.0.0"]);
    let cache = MemoryPackageCache::default();
    let logger = RecordingLogger::default();
    let runtime = RuntimePackage::new(&source, &cache, VersionReq::parse("^0.4").expect("req"));

    let package = runtime.resolve(&logger).await.expect("package");

    assert_eq!(package.version, "0.4.1");
    assert_eq!(
        source.fetches(),
        vec!["https://releases.test/0.4.1/FunctionRuntime.zip".to_string()]
    );
    assert_eq!(cache.versions(), vec!["0.4.1".to_string()]);
}

#[tokio::test]
async fn test_cached_version_is_not_downloaded_again() {
    let source = FakeReleaseSource::with_versions(&["0.4.1"]);
    let cache = MemoryPackageCache::default().with_version("0.4.1");
    let logger = RecordingLogger::default();
    let runtime = RuntimePackage::new(&source, &cache, VersionReq::STAR);

    let package = runtime.resolve(&logger).await.expect("package");

    assert_eq!(package.version, "0.4.1");
    assert!(source.fetches().is_empty());
}

#[tokio::test]
async fn test_offline_falls_back_to_newest_cached() {
    let source = FakeReleaseSource::offline();
    let cache = MemoryPackageCache::default()
        .with_version("0.3.0")
        .with_version("0.10.0");
    let logger = RecordingLogger::default();
    let runtime = RuntimePackage::new(&source, &cache, VersionReq::STAR);

    let package = runtime.resolve(&logger).await.expect("package");

    assert_eq!(package.version, "0.10.0");
    assert!(logger.contains(Level::Warning, "Using cached runtime package 0.10.0"));
}

#[tokio::test]
async fn test_offline_with_empty_cache_yields_none() {
    let source = FakeReleaseSource::offline();
    let cache = MemoryPackageCache::default();
    let logger = RecordingLogger::default();
    let runtime = RuntimePackage::new(&source, &cache, VersionReq::STAR);

    assert!(runtime.resolve(&logger).await.is_none());
}

#[tokio::test]
async fn test_find_version_errors_when_nothing_matches() {
    let source = FakeReleaseSource::with_versions(&["0.3.0"]);
    let cache = MemoryPackageCache::default();
    let runtime = RuntimePackage::new(&source, &cache, VersionReq::parse(">=1").expect("req"));

    let err = runtime.find_version().await.unwrap_err();
    assert!(err.to_string().contains("no runtime release matches"));
}

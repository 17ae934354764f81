//! Runtime package references.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// A published release of the Function runtime package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePackageRef {
    /// Release version without the leading `v`.
    pub version: String,
    pub published_at: Option<DateTime<Utc>>,
    pub download_url: String,
}

/// A runtime package available on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPackage {
    pub version: String,
    pub path: PathBuf,
}

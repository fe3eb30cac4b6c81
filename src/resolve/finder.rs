//! Upward search for the package that owns a directory.

use super::reader::{manifest_path, read_manifest};
use crate::model::PackageManifest;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory that marks a repository root; the search never crosses it.
pub const DEFAULT_ROOT_MARKER: &str = ".git";

/// Maximum number of parent directories visited per search.
pub const DEFAULT_MAX_HOPS: usize = 32;

/// The nearest identifiable manifest and the directory that holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundPackage {
    pub manifest: PackageManifest,
    pub directory: PathBuf,
}

/// Locates the package that owns a directory.
///
/// A trait so the registry can be driven by an instrumented or in-memory
/// finder in tests.
#[async_trait]
pub trait PackageFinder: Send + Sync {
    /// Nearest ancestor of `start_dir` (inclusive) with a manifest carrying
    /// both a name and a version.
    async fn find(&self, start_dir: &Path) -> Option<FoundPackage>;
}

/// Filesystem [`PackageFinder`].
#[derive(Debug, Clone)]
pub struct FsPackageFinder {
    root_marker: String,
    max_hops: usize,
}

impl Default for FsPackageFinder {
    fn default() -> Self {
        Self {
            root_marker: DEFAULT_ROOT_MARKER.to_string(),
            max_hops: DEFAULT_MAX_HOPS,
        }
    }
}

impl FsPackageFinder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different repository root marker directory
    #[must_use]
    pub fn with_root_marker(mut self, marker: impl Into<String>) -> Self {
        self.root_marker = marker.into();
        self
    }

    /// Bound the number of directories visited
    #[must_use]
    pub const fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    async fn identifiable_manifest_in(&self, dir: &Path) -> Option<PackageManifest> {
        if !is_file(&manifest_path(dir)).await {
            return None;
        }
        match read_manifest(dir).await {
            Ok(manifest) if manifest.is_identifiable() => Some(manifest),
            Ok(_) => {
                debug!("Skipping manifest without name or version in {}", dir.display());
                None
            }
            Err(e) => {
                debug!("Skipping unreadable manifest: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl PackageFinder for FsPackageFinder {
    async fn find(&self, start_dir: &Path) -> Option<FoundPackage> {
        let mut dir = start_dir.to_path_buf();
        let mut hops_left = self.max_hops;

        loop {
            if let Some(manifest) = self.identifiable_manifest_in(&dir).await {
                return Some(FoundPackage {
                    manifest,
                    directory: dir,
                });
            }

            if is_dir(&dir.join(&self.root_marker)).await {
                warn!(
                    "No package found for {}: reached repository root {}",
                    start_dir.display(),
                    dir.display()
                );
                return None;
            }

            hops_left = hops_left.saturating_sub(1);
            if hops_left == 0 {
                debug!("Hop budget exhausted searching from {}", start_dir.display());
                return None;
            }

            match dir.parent() {
                Some(parent) if parent != dir => dir = parent.to_path_buf(),
                _ => return None,
            }
        }
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|m| m.is_file())
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|m| m.is_dir())
}

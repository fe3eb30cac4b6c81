//! License evidence gathered from files shipped with a package.

use crate::model::License;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Collects license evidence from a resolved package directory.
#[async_trait]
pub trait LicenseEvidenceGatherer: Send + Sync {
    async fn gather(&self, package_dir: &Path) -> Vec<License>;
}

/// Reads `LICENSE`, `LICENCE`, `UNLICENSE`, `NOTICE` and `COPYING` style
/// files from the top level of the package directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct LicenseFileGatherer;

impl LicenseFileGatherer {
    /// True if the file name looks like a license or notice file
    #[must_use]
    pub fn is_license_file(file_name: &str) -> bool {
        let upper = file_name.to_ascii_uppercase();
        let stem = upper.split('.').next().unwrap_or_default();
        matches!(
            stem,
            "LICENSE" | "LICENCE" | "UNLICENSE" | "UNLICENCE" | "NOTICE" | "COPYING"
        ) || upper.starts_with("LICENSE-")
            || upper.starts_with("LICENCE-")
            || upper.ends_with(".LICENSE")
    }
}

#[async_trait]
impl LicenseEvidenceGatherer for LicenseFileGatherer {
    async fn gather(&self, package_dir: &Path) -> Vec<License> {
        let mut entries = match tokio::fs::read_dir(package_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Cannot list {} for license files: {e}", package_dir.display());
                return Vec::new();
            }
        };

        let mut files = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_file && Self::is_license_file(&name) {
                files.push(name);
            }
        }
        files.sort();

        let mut evidence = Vec::with_capacity(files.len());
        for name in files {
            match tokio::fs::read_to_string(package_dir.join(&name)).await {
                Ok(text) => evidence.push(License::file_evidence(&name, text)),
                Err(e) => debug!("Skipping license file {name}: {e}"),
            }
        }
        evidence
    }
}

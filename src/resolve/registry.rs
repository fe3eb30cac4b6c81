//! Memoized module-path to package resolution.
//!
//! One registry lives for one build pass. Every [`ModulePath`] is resolved at
//! most once; repeat lookups return the same [`Arc`]. Failed resolutions are
//! not cached, so a later lookup tries again.

use super::classifier::is_external;
use super::evidence::LicenseEvidenceGatherer;
use super::finder::{FsPackageFinder, PackageFinder};
use crate::model::{License, ModuleId, ModulePath, PackageId, PackageManifest};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;
use tracing::debug;

/// What the registry knows about the package owning a module path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyInfo {
    /// Normalized manifest of the owning package
    pub manifest: PackageManifest,
    /// Directory holding the manifest
    pub directory: PathBuf,
    /// Licenses found in files of the package, empty unless collection is on
    pub license_evidence: Vec<License>,
}

impl DependencyInfo {
    /// Package identity; the finder only yields identifiable manifests
    #[must_use]
    pub fn package_id(&self) -> Option<PackageId> {
        self.manifest.package_id()
    }
}

type Slot = Arc<OnceCell<Arc<DependencyInfo>>>;

/// Per-build cache of [`DependencyInfo`] keyed by module path.
pub struct DependencyInfoRegistry<F = FsPackageFinder> {
    finder: F,
    evidence: Option<Box<dyn LicenseEvidenceGatherer>>,
    slots: Mutex<HashMap<ModulePath, Slot>>,
}

impl Default for DependencyInfoRegistry<FsPackageFinder> {
    fn default() -> Self {
        Self::new(FsPackageFinder::default())
    }
}

impl<F: PackageFinder> DependencyInfoRegistry<F> {
    pub fn new(finder: F) -> Self {
        Self {
            finder,
            evidence: None,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Collect license evidence for every package resolved from now on
    #[must_use]
    pub fn with_license_evidence(mut self, gatherer: impl LicenseEvidenceGatherer + 'static) -> Self {
        self.evidence = Some(Box::new(gatherer));
        self
    }

    /// The finder driving resolution
    pub fn finder(&self) -> &F {
        &self.finder
    }

    /// Resolve the package owning `module_path`.
    ///
    /// Different paths resolve concurrently; concurrent lookups of one path
    /// share a single resolution.
    pub async fn resolve(&self, module_path: &ModulePath) -> Option<Arc<DependencyInfo>> {
        if let Some(hit) = self.cached(module_path) {
            return Some(hit);
        }

        if !is_external(&module_path.to_string_lossy()) {
            return None;
        }

        let slot = self.slot(module_path);
        let resolved = slot
            .get_or_try_init(|| async {
                let found = self.finder.find(module_path.as_path()).await.ok_or(())?;
                let license_evidence = match &self.evidence {
                    Some(gatherer) => gatherer.gather(&found.directory).await,
                    None => Vec::new(),
                };
                debug!(
                    "Resolved {} to {}",
                    module_path,
                    found.directory.display()
                );
                Ok::<_, ()>(Arc::new(DependencyInfo {
                    manifest: found.manifest,
                    directory: found.directory,
                    license_evidence,
                }))
            })
            .await;

        match resolved {
            Ok(info) => Some(Arc::clone(info)),
            Err(()) => {
                debug!("No package owns {module_path}");
                self.evict(module_path, &slot);
                None
            }
        }
    }

    /// [`Self::resolve`] on the directory portion of a module id
    pub async fn resolve_module_id(&self, id: &ModuleId) -> Option<Arc<DependencyInfo>> {
        self.resolve(&id.module_path()).await
    }

    /// Cached info without triggering resolution
    pub fn cached(&self, module_path: &ModulePath) -> Option<Arc<DependencyInfo>> {
        self.lock().get(module_path).and_then(|slot| slot.get().cloned())
    }

    /// Number of successfully resolved module paths
    pub fn len(&self) -> usize {
        self.lock().values().filter(|slot| slot.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, module_path: &ModulePath) -> Slot {
        Arc::clone(self.lock().entry(module_path.clone()).or_default())
    }

    /// Drop an empty slot so failed lookups leave nothing behind
    fn evict(&self, module_path: &ModulePath, slot: &Slot) {
        let mut slots = self.lock();
        if slots
            .get(module_path)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && !current.initialized())
        {
            slots.remove(module_path);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ModulePath, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<F> std::fmt::Debug for DependencyInfoRegistry<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyInfoRegistry")
            .field("license_evidence", &self.evidence.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::finder::FoundPackage;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Finder that answers from a fixed table and counts calls
    #[derive(Default)]
    struct TableFinder {
        packages: HashMap<PathBuf, PackageManifest>,
        calls: AtomicUsize,
    }

    impl TableFinder {
        fn with(mut self, dir: &str, name: &str, version: &str) -> Self {
            self.packages
                .insert(PathBuf::from(dir), PackageManifest::new(name, version));
            self
        }
    }

    #[async_trait]
    impl PackageFinder for TableFinder {
        async fn find(&self, start_dir: &Path) -> Option<FoundPackage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            start_dir.ancestors().find_map(|dir| {
                self.packages.get(dir).map(|manifest| FoundPackage {
                    manifest: manifest.clone(),
                    directory: dir.to_path_buf(),
                })
            })
        }
    }

    #[tokio::test]
    async fn test_repeat_lookup_is_reference_equal() {
        let registry = DependencyInfoRegistry::new(
            TableFinder::default().with("/p/node_modules/a", "a", "1.0.0"),
        );
        let path = ModulePath::new("/p/node_modules/a/lib");

        let first = registry.resolve(&path).await.unwrap();
        let second = registry.resolve(&path).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.finder().calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_share_one_resolution() {
        let registry = DependencyInfoRegistry::new(
            TableFinder::default().with("/p/node_modules/a", "a", "1.0.0"),
        );
        let path = ModulePath::new("/p/node_modules/a");

        let results =
            futures::future::join_all((0..8).map(|_| registry.resolve(&path))).await;

        assert!(results.iter().all(Option::is_some));
        assert_eq!(registry.finder().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_external_path_is_not_resolved() {
        let registry = DependencyInfoRegistry::new(TableFinder::default().with("/p", "app", "1.0.0"));

        assert!(registry.resolve(&ModulePath::new("/p/src")).await.is_none());
        assert_eq!(registry.finder().calls.load(Ordering::SeqCst), 0);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let registry = DependencyInfoRegistry::new(TableFinder::default());
        let path = ModulePath::new("/p/node_modules/ghost");

        assert!(registry.resolve(&path).await.is_none());
        assert!(registry.resolve(&path).await.is_none());
        assert_eq!(registry.finder().calls.load(Ordering::SeqCst), 2);
        assert!(registry.cached(&path).is_none());
    }

    #[tokio::test]
    async fn test_failed_lookups_leave_no_slots() {
        let registry = DependencyInfoRegistry::new(
            TableFinder::default().with("/p/node_modules/a", "a", "1.0.0"),
        );

        for i in 0..16 {
            let path = ModulePath::new(format!("/p/node_modules/ghost-{i}"));
            assert!(registry.resolve(&path).await.is_none());
        }
        assert!(registry.lock().is_empty());

        let found = ModulePath::new("/p/node_modules/a");
        assert!(registry.resolve(&found).await.is_some());
        assert_eq!(registry.lock().len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_module_id_uses_dirname() {
        let registry = DependencyInfoRegistry::new(
            TableFinder::default().with("/p/node_modules/a", "a", "1.0.0"),
        );
        let info = registry
            .resolve_module_id(&ModuleId::new("/p/node_modules/a/index.js"))
            .await
            .unwrap();
        assert_eq!(info.package_id(), Some(PackageId::new("a", "1.0.0")));
        assert!(registry
            .cached(&ModulePath::new("/p/node_modules/a"))
            .is_some());
    }

    #[tokio::test]
    async fn test_license_evidence_collected_when_enabled() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = tmp.path().join("node_modules/a");
        std::fs::create_dir_all(&pkg).unwrap();
        std::fs::write(pkg.join("package.json"), r#"{"name":"a","version":"1.0.0"}"#).unwrap();
        std::fs::write(pkg.join("LICENSE"), "MIT").unwrap();

        let registry = DependencyInfoRegistry::default()
            .with_license_evidence(crate::resolve::LicenseFileGatherer);
        let info = registry.resolve(&ModulePath::new(&pkg)).await.unwrap();
        assert_eq!(info.license_evidence.len(), 1);

        let plain = DependencyInfoRegistry::default();
        let info = plain.resolve(&ModulePath::new(&pkg)).await.unwrap();
        assert!(info.license_evidence.is_empty());
    }
}

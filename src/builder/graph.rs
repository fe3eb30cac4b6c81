//! Package-level dependency graph reconstruction.

use super::component::{component_from_manifest, npm_purl};
use crate::analyzer::ExternalModuleRecord;
use crate::model::{Bom, ComponentType, ModulePath, PackageManifest};
use crate::resolve::{DependencyInfo, DependencyInfoRegistry, PackageFinder};
use futures::future::join_all;
use indexmap::IndexSet;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Counters of one builder run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Records visited, including repeats
    pub records: usize,
    /// Components newly registered
    pub components: usize,
    /// Records without a resolvable package
    pub skipped: usize,
}

/// Folds external module records into package components and `dependsOn`
/// edges of a [`Bom`].
///
/// Module paths are all resolved up front, concurrently. The walk itself is
/// sequential, so component registration needs no locking.
pub struct BomGraphBuilder<'a, F: PackageFinder> {
    registry: &'a DependencyInfoRegistry<F>,
    root_manifest: Option<&'a PackageManifest>,
}

impl<'a, F: PackageFinder> BomGraphBuilder<'a, F> {
    pub fn new(registry: &'a DependencyInfoRegistry<F>) -> Self {
        Self {
            registry,
            root_manifest: None,
        }
    }

    /// Add root -> package edges for packages the root manifest declares
    #[must_use]
    pub fn with_root_manifest(mut self, manifest: Option<&'a PackageManifest>) -> Self {
        self.root_manifest = manifest;
        self
    }

    pub async fn build(&self, records: &[ExternalModuleRecord], bom: &mut Bom) -> BuildSummary {
        let resolved = self.resolve_all(records).await;
        let mut walk = Walk {
            resolved: &resolved,
            root_ref: bom.root_component().map(|c| c.bom_ref.clone()),
            root_manifest: self.root_manifest,
            bom,
            summary: BuildSummary::default(),
        };

        for record in records {
            walk.visit(record, None);
        }

        let summary = walk.summary;
        info!(
            "Built {} components from {} module records ({} skipped)",
            summary.components, summary.records, summary.skipped
        );
        summary
    }

    async fn resolve_all<'r>(
        &self,
        records: &'r [ExternalModuleRecord],
    ) -> HashMap<&'r ModulePath, Arc<DependencyInfo>> {
        let paths: IndexSet<&ModulePath> = records
            .iter()
            .flat_map(ExternalModuleRecord::iter)
            .map(|record| &record.module_path)
            .collect();
        debug!("Resolving {} module paths", paths.len());

        join_all(
            paths
                .into_iter()
                .map(|path| async move { (path, self.registry.resolve(path).await) }),
        )
        .await
        .into_iter()
        .filter_map(|(path, info)| info.map(|info| (path, info)))
        .collect()
    }
}

struct Walk<'w, 'r> {
    resolved: &'w HashMap<&'r ModulePath, Arc<DependencyInfo>>,
    root_ref: Option<String>,
    root_manifest: Option<&'w PackageManifest>,
    bom: &'w mut Bom,
    summary: BuildSummary,
}

impl Walk<'_, '_> {
    /// Register the record's package and link it under `owner`.
    ///
    /// Children are visited on every occurrence, so edges reachable through
    /// any branch end up in the graph even when the package was registered
    /// through another branch first.
    fn visit(&mut self, record: &ExternalModuleRecord, owner: Option<&str>) {
        self.summary.records += 1;

        let Some(bom_ref) = self.register(record) else {
            self.summary.skipped += 1;
            for child in &record.depends_on {
                self.visit(child, owner);
            }
            return;
        };

        if let Some(owner) = owner {
            self.bom.add_dependency(owner, &bom_ref);
        }

        for child in &record.depends_on {
            self.visit(child, Some(&bom_ref));
        }
    }

    /// bom-ref of the record's package, registering it on first sight
    fn register(&mut self, record: &ExternalModuleRecord) -> Option<String> {
        let resolved = self.resolved;
        let Some(info) = resolved.get(&record.module_path) else {
            warn!("Missing dependency info for module {}", record.module_id);
            return None;
        };
        let id = info.package_id()?;

        // Vendored files without a manifest of their own can resolve to the
        // project itself; the root stays a single node
        if let Some(root_ref) = &self.root_ref {
            if npm_purl(id.name(), Some(id.version())).is_ok_and(|purl| &purl == root_ref) {
                debug!("Module {} belongs to the root component", record.module_id);
                return Some(root_ref.clone());
            }
        }

        let bom_ref = if let Some(existing) = self.bom.get_component(&id) {
            existing.bom_ref.clone()
        } else {
            let mut component = match component_from_manifest(&info.manifest, ComponentType::Library) {
                Ok(component) => component,
                Err(e) => {
                    warn!("Cannot describe package {id}: {e}");
                    return None;
                }
            };
            component.license_evidence.clone_from(&info.license_evidence);
            let bom_ref = component.bom_ref.clone();
            debug!("Registered component {id}");
            self.bom.add_component(id.clone(), component);
            self.summary.components += 1;
            bom_ref
        };

        if let (Some(root_ref), Some(root_manifest)) = (&self.root_ref, self.root_manifest) {
            if root_manifest.declares_dependency(id.name()) {
                self.bom.add_dependency(root_ref, &bom_ref);
            }
        }

        Some(bom_ref)
    }
}

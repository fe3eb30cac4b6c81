//! State of one build pass.

use crate::analyzer::{ModuleInfo, ModuleRegistry};
use crate::model::{Bom, PackageManifest};
use crate::resolve::{DependencyInfoRegistry, FsPackageFinder, PackageFinder};

/// Everything one build pass accumulates.
///
/// Created when the build starts and dropped after the BOM is emitted, so
/// nothing leaks between passes of a watch-mode bundler.
#[derive(Debug)]
pub struct BuildContext<F: PackageFinder = FsPackageFinder> {
    bom: Bom,
    registry: DependencyInfoRegistry<F>,
    modules: ModuleRegistry,
    root_manifest: Option<PackageManifest>,
}

impl<F: PackageFinder> BuildContext<F> {
    pub fn new(bom: Bom, registry: DependencyInfoRegistry<F>) -> Self {
        Self {
            bom,
            registry,
            modules: ModuleRegistry::new(),
            root_manifest: None,
        }
    }

    /// Remember the manifest the root component was built from
    pub fn set_root_manifest(&mut self, manifest: PackageManifest) {
        self.root_manifest = Some(manifest);
    }

    pub fn record_module(&mut self, info: ModuleInfo) {
        self.modules.record(info);
    }

    #[must_use]
    pub fn bom(&self) -> &Bom {
        &self.bom
    }

    pub fn bom_mut(&mut self) -> &mut Bom {
        &mut self.bom
    }

    #[must_use]
    pub fn registry(&self) -> &DependencyInfoRegistry<F> {
        &self.registry
    }

    #[must_use]
    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    #[must_use]
    pub fn root_manifest(&self) -> Option<&PackageManifest> {
        self.root_manifest.as_ref()
    }

    /// Move the recorded modules out, leaving an empty graph behind
    pub fn take_modules(&mut self) -> ModuleRegistry {
        std::mem::take(&mut self.modules)
    }

    /// Split borrow for the graph builder: resolution inputs and the BOM
    pub fn builder_parts(
        &mut self,
    ) -> (&DependencyInfoRegistry<F>, Option<&PackageManifest>, &mut Bom) {
        (&self.registry, self.root_manifest.as_ref(), &mut self.bom)
    }

    /// Hand out the finished BOM, dropping all other state
    #[must_use]
    pub fn into_bom(self) -> Bom {
        self.bom
    }
}

//! Bundler lifecycle integration.

use super::context::BuildContext;
use super::output::AssetEmitter;
use crate::analyzer::{analyze, BuildSnapshot, ModuleGraph, ModuleInfo, OutputBundle};
use crate::builder::{component_from_manifest, BomGraphBuilder};
use crate::config::{RootDetectionSeverity, SbomConfig, WELL_KNOWN_SBOM_PATH};
use crate::error::{OptionContext, Result, SbomError};
use crate::model::{Bom, BomComponent, LifecyclePhase, PackageManifest, Tool};
use crate::resolve::{read_manifest, DependencyInfoRegistry, LicenseFileGatherer, VENDOR_DIRECTORY};
use crate::serialize::{parse_formats, BomSerializer, JsonSerializer, OutputFormat};
use chrono::Utc;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Bundlers whose installed version is recorded in `metadata.tools`.
const KNOWN_BUNDLERS: &[&str] = &["vite", "rollup"];

/// Callback that may edit the BOM around component collection.
pub type CollectHook = Box<dyn Fn(&mut Bom) + Send + Sync>;

/// SBOM generation hooked into a bundler's build lifecycle.
///
/// 1. [`build_start`](Self::build_start) opens a fresh build pass
/// 2. [`module_parsed`](Self::module_parsed) records each parsed module
/// 3. [`generate_bundle`](Self::generate_bundle) resolves, builds and emits
///    the BOM, then closes the pass
pub struct SbomPlugin {
    config: SbomConfig,
    cwd: PathBuf,
    before_collect: Option<CollectHook>,
    after_collect: Option<CollectHook>,
    context: Option<BuildContext>,
}

impl SbomPlugin {
    /// Plugin for the project in `cwd`
    pub fn new(config: SbomConfig, cwd: impl Into<PathBuf>) -> Self {
        Self {
            config,
            cwd: cwd.into(),
            before_collect: None,
            after_collect: None,
            context: None,
        }
    }

    /// Run `hook` on the BOM before components are collected
    #[must_use]
    pub fn with_before_collect(mut self, hook: impl Fn(&mut Bom) + Send + Sync + 'static) -> Self {
        self.before_collect = Some(Box::new(hook));
        self
    }

    /// Run `hook` on the BOM after components are collected
    #[must_use]
    pub fn with_after_collect(mut self, hook: impl Fn(&mut Bom) + Send + Sync + 'static) -> Self {
        self.after_collect = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn config(&self) -> &SbomConfig {
        &self.config
    }

    /// State of the running build pass, if one is open
    #[must_use]
    pub fn context(&self) -> Option<&BuildContext> {
        self.context.as_ref()
    }

    /// Open a build pass.
    ///
    /// Validates the configuration, prepares document metadata and, when
    /// autodetection is on, describes the project from its manifest.
    pub async fn build_start(&mut self) -> Result<()> {
        self.config.ensure_valid()?;

        let mut bom = Bom::new(self.config.spec_version);
        if self.config.generate_serial {
            bom.serial_number = Some(format!("urn:uuid:{}", Uuid::new_v4()));
        }
        if self.config.save_timestamp {
            bom.metadata.timestamp = Some(Utc::now());
        }
        bom.metadata.lifecycles.push(LifecyclePhase::Build);
        bom.metadata.tools = detect_tools(&self.cwd).await;
        bom.metadata.supplier.clone_from(&self.config.supplier);
        bom.metadata.properties.clone_from(&self.config.properties);

        let mut registry = DependencyInfoRegistry::default();
        if self.config.collect_license_evidence {
            if !self.config.spec_version.supports_license_evidence() {
                warn!(
                    "License evidence is not part of CycloneDX {}; it will be collected but not written",
                    self.config.spec_version
                );
            }
            registry = registry.with_license_evidence(LicenseFileGatherer);
        }

        let mut context = BuildContext::new(bom, registry);

        if self.config.autodetect {
            match self.detect_root().await {
                Ok((manifest, component)) => {
                    info!("Root component: {}", component.display_name());
                    context.bom_mut().set_root_component(component);
                    context.set_root_manifest(manifest);
                }
                Err(e) => match self.config.root_detection_severity {
                    RootDetectionSeverity::Error => return Err(e),
                    RootDetectionSeverity::Warn => warn!("{e}"),
                },
            }
        }

        self.context = Some(context);
        Ok(())
    }

    /// Record a parsed module of the running build pass
    pub fn module_parsed(&mut self, info: ModuleInfo) -> Result<()> {
        self.context
            .as_mut()
            .context_none("module_parsed called outside a build pass")?
            .record_module(info);
        Ok(())
    }

    /// Build and emit the BOM from the recorded modules, closing the pass
    pub async fn generate_bundle(
        &mut self,
        bundle: &OutputBundle,
        emitter: &dyn AssetEmitter,
    ) -> Result<Bom> {
        let formats = parse_formats(&self.config.out_formats)?;
        let mut context = self.take_context()?;
        let modules = context.take_modules();
        self.finish(context, &modules, bundle, &formats, emitter).await
    }

    /// [`Self::generate_bundle`] against a module graph owned by the bundler
    pub async fn generate_bundle_with_graph<G: ModuleGraph + ?Sized>(
        &mut self,
        graph: &G,
        bundle: &OutputBundle,
        emitter: &dyn AssetEmitter,
    ) -> Result<Bom> {
        let formats = parse_formats(&self.config.out_formats)?;
        let context = self.take_context()?;
        self.finish(context, graph, bundle, &formats, emitter).await
    }

    /// Run a whole build pass from a recorded build
    pub async fn run_snapshot(
        &mut self,
        snapshot: BuildSnapshot,
        emitter: &dyn AssetEmitter,
    ) -> Result<Bom> {
        self.build_start().await?;
        let BuildSnapshot { modules, bundle } = snapshot;
        for info in modules {
            self.module_parsed(info)?;
        }
        self.generate_bundle(&bundle, emitter).await
    }

    /// File name of the BOM in `format`, relative to the bundle output
    #[must_use]
    pub fn asset_name(&self, format: OutputFormat) -> String {
        let file = format!("{}.{}", self.config.out_filename, format.extension());
        let dir = self.config.out_dir.to_string_lossy().replace('\\', "/");
        let dir = dir.trim_end_matches('/');
        if dir.is_empty() || dir == "." {
            file
        } else {
            format!("{dir}/{file}")
        }
    }

    fn take_context(&mut self) -> Result<BuildContext> {
        self.context
            .take()
            .context_none("generate_bundle called outside a build pass")
    }

    async fn finish<G: ModuleGraph + ?Sized>(
        &self,
        mut context: BuildContext,
        graph: &G,
        bundle: &OutputBundle,
        formats: &[OutputFormat],
        emitter: &dyn AssetEmitter,
    ) -> Result<Bom> {
        let records = analyze(graph, bundle, self.config.resolve_limit).await;

        if let Some(hook) = &self.before_collect {
            hook(context.bom_mut());
        }

        let (registry, root_manifest, bom) = context.builder_parts();
        BomGraphBuilder::new(registry)
            .with_root_manifest(root_manifest)
            .build(&records, bom)
            .await;

        if let Some(hook) = &self.after_collect {
            hook(context.bom_mut());
        }

        let bom = context.into_bom();
        for format in formats {
            let document = format.serializer().serialize(&bom)?;
            emitter.emit_asset(&self.asset_name(*format), &document).await?;
        }
        if self.config.include_well_known {
            let document = JsonSerializer::new().serialize(&bom)?;
            emitter.emit_asset(WELL_KNOWN_SBOM_PATH, &document).await?;
        }

        info!(
            "SBOM written: {} components, {} dependency edges",
            bom.component_count(),
            bom.edge_count()
        );
        Ok(bom)
    }

    async fn detect_root(&self) -> Result<(PackageManifest, BomComponent)> {
        let autodetect_error = |e: SbomError| SbomError::root_autodetect(&self.cwd, e.to_string());

        let manifest = read_manifest(&self.cwd).await.map_err(autodetect_error)?;
        let component = component_from_manifest(&manifest, self.config.root_component_type)
            .map_err(autodetect_error)?;
        Ok((manifest, component))
    }
}

impl std::fmt::Debug for SbomPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SbomPlugin")
            .field("config", &self.config)
            .field("cwd", &self.cwd)
            .field("building", &self.context.is_some())
            .finish_non_exhaustive()
    }
}

/// This tool plus any known bundler installed in the project
async fn detect_tools(cwd: &Path) -> Vec<Tool> {
    let own = Tool {
        group: None,
        name: env!("CARGO_PKG_NAME").to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    };

    let bundlers = join_all(KNOWN_BUNDLERS.iter().map(|name| async move {
        let dir = cwd.join(VENDOR_DIRECTORY).join(name);
        match read_manifest(&dir).await {
            Ok(manifest) => Some(Tool {
                group: None,
                name: (*name).to_string(),
                version: manifest.version,
            }),
            Err(e) => {
                debug!("Bundler {name} not detected: {e}");
                None
            }
        }
    }))
    .await;

    std::iter::once(own).chain(bundlers.into_iter().flatten()).collect()
}

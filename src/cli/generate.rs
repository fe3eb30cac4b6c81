//! Generate command handler.
//!
//! Implements the `generate` subcommand: replays a recorded build through
//! [`SbomPlugin`] and writes the BOM next to the bundle output.

use crate::analyzer::BuildSnapshot;
use crate::config::{load_or_default, RootDetectionSeverity, SbomConfig};
use crate::model::{ComponentType, SpecVersion};
use crate::pipeline::{DirectoryEmitter, SbomPlugin};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

/// Command-line settings that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub spec_version: Option<SpecVersion>,
    pub root_component_type: Option<ComponentType>,
    pub out_dir: Option<PathBuf>,
    pub out_filename: Option<String>,
    pub out_formats: Vec<String>,
    pub resolve_limit: Option<usize>,
    pub root_detection_severity: Option<RootDetectionSeverity>,
    pub collect_license_evidence: bool,
    pub generate_serial: bool,
    pub no_timestamp: bool,
    pub no_well_known: bool,
    pub no_autodetect: bool,
}

impl ConfigOverrides {
    /// Apply every override that was given
    pub fn apply(&self, config: &mut SbomConfig) {
        if let Some(version) = self.spec_version {
            config.spec_version = version;
        }
        if let Some(component_type) = self.root_component_type {
            config.root_component_type = component_type;
        }
        if let Some(dir) = &self.out_dir {
            config.out_dir.clone_from(dir);
        }
        if let Some(name) = &self.out_filename {
            config.out_filename.clone_from(name);
        }
        if !self.out_formats.is_empty() {
            config.out_formats.clone_from(&self.out_formats);
        }
        if let Some(limit) = self.resolve_limit {
            config.resolve_limit = limit;
        }
        if let Some(severity) = self.root_detection_severity {
            config.root_detection_severity = severity;
        }
        config.collect_license_evidence |= self.collect_license_evidence;
        config.generate_serial |= self.generate_serial;
        if self.no_timestamp {
            config.save_timestamp = false;
        }
        if self.no_well_known {
            config.include_well_known = false;
        }
        if self.no_autodetect {
            config.autodetect = false;
        }
    }
}

/// Inputs of one `generate` run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Project root holding the root `package.json`
    pub project_dir: PathBuf,
    /// Recorded build to replay
    pub snapshot: PathBuf,
    /// Bundle output directory, `<project>/dist` if unset
    pub dist_dir: Option<PathBuf>,
    /// Explicit config file
    pub config_path: Option<PathBuf>,
    pub overrides: ConfigOverrides,
}

/// Run the generate command
pub fn run_generate(options: GenerateOptions) -> Result<()> {
    let (mut config, loaded_from) =
        load_or_default(options.config_path.as_deref(), &options.project_dir);
    if let Some(path) = &loaded_from {
        info!("Using config file {}", path.display());
    }
    options.overrides.apply(&mut config);

    let dist_dir = options
        .dist_dir
        .clone()
        .unwrap_or_else(|| options.project_dir.join("dist"));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async {
        let snapshot = BuildSnapshot::load(&options.snapshot).await?;
        let emitter = DirectoryEmitter::new(&dist_dir);
        let mut plugin = SbomPlugin::new(config, &options.project_dir);
        plugin.run_snapshot(snapshot, &emitter).await?;
        Ok::<_, anyhow::Error>(())
    })
}

//! Configuration types for SBOM generation.

use super::defaults;
use crate::model::{ComponentType, Organization, Property, SpecVersion};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Generation Configuration
// ============================================================================

/// Options of one SBOM generation pass.
///
/// Every field has a default, so a config file only needs the values it
/// changes. The collection hooks are not part of this struct; they are
/// registered on [`crate::pipeline::SbomPlugin`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SbomConfig {
    /// `CycloneDX` version of the emitted documents
    pub spec_version: SpecVersion,
    /// Type of the root component (the project being bundled)
    pub root_component_type: ComponentType,
    /// Directory, relative to the output directory, that receives the BOM files
    pub out_dir: PathBuf,
    /// Base file name of the BOM files, without extension
    pub out_filename: String,
    /// Serialization formats to emit (`json`, `xml`)
    pub out_formats: Vec<String>,
    /// Record the generation time in `metadata.timestamp`
    pub save_timestamp: bool,
    /// Describe the project from the `package.json` in the working directory
    pub autodetect: bool,
    /// Give the document a random `urn:uuid:` serial number
    pub generate_serial: bool,
    /// Also emit the JSON document as `.well-known/sbom`
    pub include_well_known: bool,
    /// Attach license files found in packages as license evidence
    pub collect_license_evidence: bool,
    /// Import levels followed below the modules rendered into each chunk
    pub resolve_limit: usize,
    /// Supplier of the root component
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<Organization>,
    /// Extra document properties
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
    /// What to do when the root component cannot be autodetected
    pub root_detection_severity: RootDetectionSeverity,
}

impl SbomConfig {
    /// Create a new `SbomConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `SbomConfig` builder.
    pub fn builder() -> SbomConfigBuilder {
        SbomConfigBuilder::default()
    }
}

impl Default for SbomConfig {
    fn default() -> Self {
        Self {
            spec_version: SpecVersion::default(),
            root_component_type: ComponentType::Application,
            out_dir: PathBuf::from(defaults::DEFAULT_OUT_DIR),
            out_filename: defaults::DEFAULT_OUT_FILENAME.to_string(),
            out_formats: defaults::DEFAULT_OUT_FORMATS
                .iter()
                .map(ToString::to_string)
                .collect(),
            save_timestamp: true,
            autodetect: true,
            generate_serial: false,
            include_well_known: true,
            collect_license_evidence: false,
            resolve_limit: defaults::DEFAULT_RESOLVE_LIMIT,
            supplier: None,
            properties: Vec::new(),
            root_detection_severity: RootDetectionSeverity::default(),
        }
    }
}

/// Outcome of a failed root component autodetection
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RootDetectionSeverity {
    /// Abort the build pass
    #[default]
    Error,
    /// Log a warning and continue without a root component
    Warn,
}

// ============================================================================
// Builder for SbomConfig
// ============================================================================

/// Builder for constructing `SbomConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct SbomConfigBuilder {
    config: SbomConfig,
}

impl SbomConfigBuilder {
    pub const fn spec_version(mut self, version: SpecVersion) -> Self {
        self.config.spec_version = version;
        self
    }

    pub const fn root_component_type(mut self, component_type: ComponentType) -> Self {
        self.config.root_component_type = component_type;
        self
    }

    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.out_dir = dir.into();
        self
    }

    pub fn out_filename(mut self, name: impl Into<String>) -> Self {
        self.config.out_filename = name.into();
        self
    }

    /// Replace the output format list
    pub fn out_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.out_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    pub const fn save_timestamp(mut self, enabled: bool) -> Self {
        self.config.save_timestamp = enabled;
        self
    }

    pub const fn autodetect(mut self, enabled: bool) -> Self {
        self.config.autodetect = enabled;
        self
    }

    pub const fn generate_serial(mut self, enabled: bool) -> Self {
        self.config.generate_serial = enabled;
        self
    }

    pub const fn include_well_known(mut self, enabled: bool) -> Self {
        self.config.include_well_known = enabled;
        self
    }

    pub const fn collect_license_evidence(mut self, enabled: bool) -> Self {
        self.config.collect_license_evidence = enabled;
        self
    }

    pub const fn resolve_limit(mut self, limit: usize) -> Self {
        self.config.resolve_limit = limit;
        self
    }

    pub fn supplier(mut self, supplier: Organization) -> Self {
        self.config.supplier = Some(supplier);
        self
    }

    /// Append a document property
    pub fn property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.properties.push(Property::new(name, value));
        self
    }

    pub const fn root_detection_severity(mut self, severity: RootDetectionSeverity) -> Self {
        self.config.root_detection_severity = severity;
        self
    }

    /// Build the config.
    #[must_use]
    pub fn build(self) -> SbomConfig {
        self.config
    }
}

//! Configuration module for bundle-sbom.
//!
//! This module provides:
//! - [`SbomConfig`] with a default for every option
//! - Validation through the [`Validatable`] trait
//! - YAML config file loading and discovery
//! - JSON schema generation for editor support
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use bundle_sbom::config::SbomConfig;
//!
//! let config = SbomConfig::builder()
//!     .out_formats(["json"])
//!     .collect_license_evidence(true)
//!     .build();
//!
//! use bundle_sbom::config::file::load_or_default;
//! let (config, loaded_from) = load_or_default(None, &project_dir);
//! ```
//!
//! # Configuration File
//!
//! Place a `.bundle-sbom.yaml` file in your project root or
//! `~/.config/bundle-sbom/`:
//!
//! ```yaml
//! spec_version: "1.6"
//! out_formats: [json]
//! resolve_limit: 3
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    DEFAULT_OUT_DIR, DEFAULT_OUT_FILENAME, DEFAULT_OUT_FORMATS, DEFAULT_RESOLVE_LIMIT,
    MAX_RESOLVE_LIMIT, WELL_KNOWN_SBOM_PATH,
};
pub use types::{RootDetectionSeverity, SbomConfig, SbomConfigBuilder};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, generate_full_example_config, load_config_file,
    load_or_default, ConfigFileError,
};

/// Generate a JSON Schema for the `SbomConfig` configuration format.
///
/// Documents every option of `.bundle-sbom.yaml`, for editor validation and
/// autocompletion.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(SbomConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

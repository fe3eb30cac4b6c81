//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::SbomConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[".bundle-sbom.yaml", ".bundle-sbom.yml", "bundle-sbom.yaml"];

/// Name of the per-user config directory under the platform config dir.
const USER_CONFIG_DIR: &str = "bundle-sbom";

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. The project directory
/// 3. Git repository root containing the project directory
/// 4. User config directory (`~/.config/bundle-sbom/`)
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>, project_dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
    }

    if let Some(path) = find_config_in_dir(project_dir) {
        return Some(path);
    }

    if let Some(path) = find_git_root(project_dir).and_then(|root| find_config_in_dir(&root)) {
        return Some(path);
    }

    dirs::config_dir().and_then(|dir| find_config_in_dir(&dir.join(USER_CONFIG_DIR)))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Find the git repository root by walking up from `start`.
fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Load an `SbomConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<SbomConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(SbomConfig::default());
    }
    Ok(serde_yaml::from_str(&content)?)
}

/// Load config from the discovered file, or return the default.
///
/// A file that fails to load is reported and ignored.
#[must_use]
pub fn load_or_default(
    explicit_path: Option<&Path>,
    project_dir: &Path,
) -> (SbomConfig, Option<PathBuf>) {
    discover_config_file(explicit_path, project_dir).map_or_else(
        || (SbomConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (SbomConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate an example config file content.
#[must_use]
pub fn generate_example_config() -> String {
    let example = SbomConfig::default();
    format!(
        r"# bundle-sbom configuration
# Place this file at .bundle-sbom.yaml in your project root or ~/.config/bundle-sbom/

{}",
        serde_yaml::to_string(&example).unwrap_or_default()
    )
}

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r#"# bundle-sbom configuration file
# ===============================
#
# Place it at:
#   - .bundle-sbom.yaml in your project root
#   - ~/.config/bundle-sbom/bundle-sbom.yaml for global config
#
# CLI arguments always override file settings.

# CycloneDX version: 1.4, 1.5, 1.6
spec_version: "1.5"

# Type of the project component: application, library, framework, ...
root_component_type: application

# Where the BOM files go, relative to the bundle output directory
out_dir: cyclonedx
out_filename: bom
out_formats:
  - json
  - xml

# Also write the JSON document to .well-known/sbom
include_well_known: true

# Metadata
save_timestamp: true
generate_serial: false

# Describe the project from ./package.json; error or warn when it is missing
autodetect: true
root_detection_severity: error

# Import levels followed below each chunk's own modules
resolve_limit: 2

# Attach LICENSE/NOTICE files found in packages as license evidence (1.5+)
collect_license_evidence: false

# supplier:
#   name: ACME Corp
#   urls: [https://acme.example]
#   contacts:
#     - name: Security Team
#       email: security@acme.example

# properties:
#   - name: build:pipeline
#     value: release
"#
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpecVersion;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_dir() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(".bundle-sbom.yaml");
        std::fs::write(&config_path, "resolve_limit: 3\n").unwrap();

        assert_eq!(find_config_in_dir(tmp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_in_dir_not_found() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(find_config_in_dir(tmp.path()), None);
    }

    #[test]
    fn test_discover_from_git_root() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join(".git")).unwrap();
        let config_path = tmp.path().join("bundle-sbom.yaml");
        std::fs::write(&config_path, "autodetect: false\n").unwrap();
        let project = tmp.path().join("packages/web");
        std::fs::create_dir_all(&project).unwrap();

        assert_eq!(discover_config_file(None, &project), Some(config_path));
    }

    #[test]
    fn test_discover_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("custom.yaml");
        std::fs::write(&config_path, "generate_serial: true\n").unwrap();

        assert_eq!(
            discover_config_file(Some(&config_path), tmp.path()),
            Some(config_path)
        );
    }

    #[test]
    fn test_load_config_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.yaml");
        std::fs::write(
            &config_path,
            "spec_version: \"1.6\"\ncollect_license_evidence: true\nsupplier:\n  name: ACME\n",
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.spec_version, SpecVersion::V1_6);
        assert!(config.collect_license_evidence);
        assert_eq!(config.supplier.unwrap().name.as_deref(), Some("ACME"));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config_file(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(ConfigFileError::NotFound(_))));
    }

    #[test]
    fn test_invalid_yaml_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(".bundle-sbom.yaml");
        std::fs::write(&config_path, "resolve_limit: [not, a, number]\n").unwrap();

        let (config, loaded_from) = load_or_default(None, tmp.path());
        assert_eq!(config, SbomConfig::default());
        assert!(loaded_from.is_none());
    }

    #[test]
    fn test_example_configs_parse() {
        let config: SbomConfig = serde_yaml::from_str(&generate_full_example_config()).unwrap();
        assert_eq!(config, SbomConfig::default());
        assert!(generate_example_config().contains("out_formats"));
    }
}

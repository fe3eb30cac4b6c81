//! Default values for SBOM generation.

/// Output directory for the BOM files
pub const DEFAULT_OUT_DIR: &str = "cyclonedx";

/// Base name of the BOM files
pub const DEFAULT_OUT_FILENAME: &str = "bom";

/// Formats emitted when none are configured
pub const DEFAULT_OUT_FORMATS: &[&str] = &["json", "xml"];

/// Import levels followed below each chunk module
pub const DEFAULT_RESOLVE_LIMIT: usize = crate::analyzer::DEFAULT_RESOLVE_LIMIT;

/// Largest accepted resolve limit.
///
/// The walk keeps no visited-set, so its cost grows with the fan-out raised
/// to this power.
pub const MAX_RESOLVE_LIMIT: usize = 16;

/// Well-known location of the JSON document (RFC 8615)
pub const WELL_KNOWN_SBOM_PATH: &str = ".well-known/sbom";

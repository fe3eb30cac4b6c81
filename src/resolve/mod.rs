//! Module-to-package resolution.
//!
//! Turns a module identifier into the package that owns it:
//!
//! - [`classifier`]: virtual vs. third-party module ids
//! - [`reader`]: `package.json` loading and normalization
//! - [`finder`]: upward search for the nearest identifiable manifest
//! - [`registry`]: per-build memoization of finder results
//! - [`evidence`]: license files shipped inside a package

pub mod classifier;
pub mod evidence;
pub mod finder;
pub mod reader;
pub mod registry;

pub use classifier::{is_external, is_external_module, VENDOR_DIRECTORY};
pub use evidence::{LicenseEvidenceGatherer, LicenseFileGatherer};
pub use finder::{FoundPackage, FsPackageFinder, PackageFinder};
pub use reader::{parse_manifest, read_manifest, MANIFEST_FILE_NAME};
pub use registry::{DependencyInfo, DependencyInfoRegistry};

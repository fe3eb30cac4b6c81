//! Data model of the resolution engine and the BOM document.
//!
//! Raw manifests, normalized manifests and BOM components are three distinct
//! types with one-way conversions between them:
//!
//! ```text
//! package.json --(resolve::parse_manifest)--> PackageManifest
//!              --(builder::component_from_manifest)--> BomComponent
//! ```

mod bom;
mod identifiers;
mod license;
mod manifest;
mod metadata;

pub use bom::*;
pub use identifiers::*;
pub use license::*;
pub use manifest::*;
pub use metadata::*;

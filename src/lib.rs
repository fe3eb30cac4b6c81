//! **`CycloneDX` SBOMs for JavaScript bundles.**
//!
//! `bundle-sbom` describes exactly the third-party npm packages that end up in
//! a bundler's output. It follows the bundler's module graph from every
//! emitted chunk, finds the `package.json` that owns each vendored module and
//! writes the result as a `CycloneDX` document in JSON and XML.
//!
//! ## Core Concepts & Modules
//!
//! - **[`analyzer`]**: Walks the module graph below each output chunk and
//!   records the vendored (`node_modules`) modules it reaches, as a tree of
//!   [`ExternalModuleRecord`]s bounded by a resolve limit.
//! - **[`resolve`]**: Maps module paths to their owning package through a
//!   concurrent, memoizing [`DependencyInfoRegistry`].
//! - **[`builder`]**: Turns resolved packages into BOM components and
//!   dependency edges with [`BomGraphBuilder`].
//! - **[`serialize`]**: `CycloneDX` 1.4 to 1.6 writers for JSON and XML.
//! - **[`pipeline`]**: The bundler-facing [`SbomPlugin`] lifecycle and the
//!   [`AssetEmitter`] that receives generated files.
//! - **[`config`]**: Plugin options, YAML config files and their JSON schema.
//! - **[`model`]**: Manifests, identifiers and the in-memory [`Bom`].
//!
//! ## Getting Started
//!
//! ```no_run
//! use bundle_sbom::{
//!     analyzer::{ModuleInfo, OutputBundle},
//!     pipeline::DirectoryEmitter,
//!     SbomConfig, SbomPlugin,
//! };
//!
//! # async fn run() -> bundle_sbom::Result<()> {
//! let mut plugin = SbomPlugin::new(SbomConfig::default(), "/work/app");
//! plugin.build_start().await?;
//!
//! plugin.module_parsed(
//!     ModuleInfo::new("/work/app/src/main.js")
//!         .with_imports(["/work/app/node_modules/react/index.js"]),
//! )?;
//! plugin.module_parsed(ModuleInfo::new("/work/app/node_modules/react/index.js"))?;
//!
//! let bundle = OutputBundle::new().with_chunk(
//!     "main.js",
//!     ["/work/app/src/main.js", "/work/app/node_modules/react/index.js"],
//! );
//! let bom = plugin
//!     .generate_bundle(&bundle, &DirectoryEmitter::new("/work/app/dist"))
//!     .await?;
//! println!("{} components", bom.component_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Command-Line Interface (CLI)
//!
//! The `bundle-sbom` binary replays a recorded build, see
//! [`analyzer::BuildSnapshot`] for the input format.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // Doc completeness: # Errors / # Panics sections are not written for every fn
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // Config structs use bools for independent on/off options
    clippy::struct_excessive_bools,
    // Variable names like `from`/`to` are clear in context
    clippy::similar_names
)]

pub mod analyzer;
pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod resolve;
pub mod serialize;

// Re-export main types for convenience
pub use analyzer::{ExternalModuleAnalyzer, ExternalModuleRecord, ModuleGraph, ModuleInfo};
pub use builder::{BomGraphBuilder, BuildSummary};
pub use config::{ConfigError, RootDetectionSeverity, SbomConfig, SbomConfigBuilder, Validatable};
pub use error::{ErrorContext, OptionContext, Result, SbomError};
pub use model::{Bom, BomComponent, PackageManifest, SpecVersion};
pub use pipeline::{AssetEmitter, SbomPlugin};
pub use resolve::{DependencyInfoRegistry, FsPackageFinder, PackageFinder};
pub use serialize::{BomSerializer, JsonSerializer, OutputFormat, XmlSerializer};

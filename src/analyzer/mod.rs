//! External module analysis.
//!
//! Reads the bundler's module graph and output bundle and produces one
//! [`ExternalModuleRecord`] tree per third-party module rendered into a chunk.

mod analyze;
mod graph;

pub use analyze::{analyze, ExternalModuleAnalyzer, ExternalModuleRecord, DEFAULT_RESOLVE_LIMIT};
pub use graph::{BuildSnapshot, ModuleGraph, ModuleInfo, ModuleRegistry, OutputBundle, OutputItem};

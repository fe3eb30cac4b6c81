//! BOM component graph construction.
//!
//! Every package becomes exactly one component, keyed by `name@version`,
//! however many of its files the bundle pulled in. Edges between packages
//! are derived from file-level import edges.

mod component;
mod graph;

pub use component::{component_from_manifest, npm_purl};
pub use graph::{BomGraphBuilder, BuildSummary};

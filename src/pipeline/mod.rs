//! Build pipeline.
//!
//! Wires the resolution engine into a bundler's lifecycle: one
//! [`BuildContext`] per build pass, driven by [`SbomPlugin`], with generated
//! files handed to an [`AssetEmitter`].

mod context;
mod output;
mod plugin;

pub use context::BuildContext;
pub use output::{AssetEmitter, DirectoryEmitter, MemoryEmitter};
pub use plugin::{CollectHook, SbomPlugin};

/// Exit codes of the command-line tool
pub mod exit_codes {
    /// The BOM was generated
    pub const SUCCESS: i32 = 0;
    /// An error occurred
    pub const ERROR: i32 = 1;
}

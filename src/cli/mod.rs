//! CLI command handlers.
//!
//! Testable handlers invoked by main.rs, one per subcommand that does more
//! than print.

mod generate;

pub use generate::{run_generate, ConfigOverrides, GenerateOptions};

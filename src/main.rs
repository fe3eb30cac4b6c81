//! bundle-sbom: `CycloneDX` SBOMs from JavaScript bundler builds
//!
//! Replays a recorded module graph, resolves the npm packages behind it and
//! writes the BOM next to the bundle output.

#![allow(clippy::struct_excessive_bools)]

use anyhow::{Context, Result};
use bundle_sbom::{
    cli::{self, ConfigOverrides, GenerateOptions},
    config::{self, RootDetectionSeverity},
    model::{ComponentType, SpecVersion},
    pipeline::exit_codes,
};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nCycloneDX versions: 1.4, 1.5, 1.6",
        "\nOutput formats:     json, xml"
    )
}

#[derive(Parser)]
#[command(name = "bundle-sbom")]
#[command(author = "Binarly.io")]
#[command(version, long_version = build_long_version())]
#[command(about = "CycloneDX SBOMs from JavaScript bundler builds", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  SBOM generated
    1  Error occurred

EXAMPLES:
    # Generate dist/cyclonedx/bom.{json,xml} from a recorded build
    bundle-sbom generate --snapshot build.json

    # JSON only, CycloneDX 1.6, deeper dependency resolution
    bundle-sbom generate --snapshot build.json -f json --spec-version 1.6 --resolve-limit 4")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `generate` subcommand
#[derive(Parser)]
struct GenerateArgs {
    /// Recorded build (modules and output bundle) as JSON
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Project root containing package.json
    #[arg(short = 'C', long, default_value = ".")]
    cwd: PathBuf,

    /// Bundle output directory [default: <cwd>/dist]
    #[arg(short, long)]
    dist: Option<PathBuf>,

    /// Output formats (json, xml); may be repeated
    #[arg(short = 'f', long = "format", value_delimiter = ',')]
    formats: Vec<String>,

    /// `CycloneDX` specification version
    #[arg(long)]
    spec_version: Option<SpecVersion>,

    /// Type of the root component
    #[arg(long)]
    root_component_type: Option<ComponentType>,

    /// Directory for BOM files, relative to the bundle output
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// BOM file name without extension
    #[arg(long)]
    out_filename: Option<String>,

    /// How many levels of imports to follow below each chunk module
    #[arg(long)]
    resolve_limit: Option<usize>,

    /// What to do when the root component cannot be detected
    #[arg(long, value_enum)]
    root_detection: Option<RootDetectionSeverity>,

    /// Attach LICENSE file texts as license evidence
    #[arg(long)]
    license_evidence: bool,

    /// Add a random serial number
    #[arg(long)]
    serial: bool,

    /// Omit the generation timestamp
    #[arg(long)]
    no_timestamp: bool,

    /// Skip the .well-known/sbom copy
    #[arg(long)]
    no_well_known: bool,

    /// Do not describe the project from its package.json
    #[arg(long)]
    no_autodetect: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an SBOM from a recorded build
    Generate(GenerateArgs),

    /// Print an example config file
    Config {
        /// Include every option with its default value
        #[arg(long)]
        full: bool,
    },

    /// Generate JSON Schema for the config file format
    Schema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Generate(args) => {
            let options = GenerateOptions {
                project_dir: args.cwd,
                snapshot: args.snapshot,
                dist_dir: args.dist,
                config_path: cli.config,
                overrides: ConfigOverrides {
                    spec_version: args.spec_version,
                    root_component_type: args.root_component_type,
                    out_dir: args.out_dir,
                    out_filename: args.out_filename,
                    out_formats: args.formats,
                    resolve_limit: args.resolve_limit,
                    root_detection_severity: args.root_detection,
                    collect_license_evidence: args.license_evidence,
                    generate_serial: args.serial,
                    no_timestamp: args.no_timestamp,
                    no_well_known: args.no_well_known,
                    no_autodetect: args.no_autodetect,
                },
            };
            if let Err(e) = cli::run_generate(options) {
                tracing::error!("{e:#}");
                std::process::exit(exit_codes::ERROR);
            }
            Ok(())
        }

        Commands::Config { full } => {
            let content = if full {
                config::generate_full_example_config()
            } else {
                config::generate_example_config()
            };
            print!("{content}");
            Ok(())
        }

        Commands::Schema { output } => {
            let schema = config::generate_json_schema();
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(())
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "bundle-sbom", &mut io::stdout());
            Ok(())
        }
    }
}

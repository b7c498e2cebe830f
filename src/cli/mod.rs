//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod build;
mod inspect;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{default_config, find_config, load_config, PackConfig};
use crate::pack::ListingOrder;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// texpipe - Pack asset directories into texture atlases
#[derive(Parser)]
#[command(name = "texpipe")]
#[command(about = "texpipe - Run TexturePacker over configured asset directories")]
#[command(version)]
pub struct Cli {
    /// Path to texpipe.toml (default: search upward from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pack every qualifying subdirectory of every pipeline
    Build {
        /// Only run the named pipeline (repeatable)
        #[arg(short, long = "pipeline")]
        pipelines: Vec<String>,

        /// Print the commands without creating directories or running the packer
        #[arg(long)]
        dry_run: bool,

        /// Verbose output (show command lines and declared paths)
        #[arg(short, long)]
        verbose: bool,

        /// Emit one JSON object per event instead of text
        #[arg(long)]
        json: bool,

        /// Packer executable to run
        #[arg(long)]
        executable: Option<String>,

        /// Treat a non-zero packer exit code as a failure
        #[arg(long)]
        fail_on_exit_code: bool,

        /// Subdirectory order: lexical or filesystem
        #[arg(long)]
        listing_order: Option<ListingOrder>,
    },

    /// Check pipeline definitions without touching the filesystem
    Check,

    /// Print the directories read and written by the configured pipelines
    Paths {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Entry point for the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Build {
            pipelines,
            dry_run,
            verbose,
            json,
            executable,
            fail_on_exit_code,
            listing_order,
        } => build::run_build(
            config_path,
            build::BuildArgs {
                pipelines,
                dry_run,
                verbose,
                json,
                executable,
                fail_on_exit_code,
                listing_order,
            },
        ),
        Commands::Check => inspect::run_check(config_path),
        Commands::Paths { json } => inspect::run_paths(config_path, json),
    }
}

/// Load the configuration and determine the project root.
///
/// An explicit path must exist; otherwise the config is searched upward
/// from the current directory and defaults are used when none is found.
pub(crate) fn load_project(
    config_path: Option<&Path>,
    verbose: bool,
) -> Result<(PackConfig, PathBuf), ExitCode> {
    let found = config_path.map(Path::to_path_buf).or_else(find_config);

    match found {
        Some(path) => {
            if verbose {
                eprintln!("Using config: {}", path.display());
            }
            let config = load_config(Some(&path)).map_err(|e| {
                eprintln!("Error loading config: {}", e);
                ExitCode::from(EXIT_INVALID_ARGS)
            })?;
            let root = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
            Ok((config, root))
        }
        None => {
            if verbose {
                eprintln!("No texpipe.toml found, using defaults");
            }
            Ok((default_config(), std::env::current_dir().unwrap_or_default()))
        }
    }
}

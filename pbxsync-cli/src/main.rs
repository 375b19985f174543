//! pbxsync — keep an Xcode project's sources in step with the folders on disk.
//!
//! # Usage
//!
//! ```text
//! pbxsync init [--config FILE] [--force]
//! pbxsync sync [--config FILE] [--project P] [--source-root D]... [--exclude S]...
//!              [--target NAME] [--dry-run] [--check] [--json]
//! pbxsync status [--config FILE] [--json]
//! ```
//!
//! Running `pbxsync sync` with no flags and no `pbxsync.yaml` uses the built-in
//! layout: the project under `../prebuilt_ios/`, sources under
//! `../source_common` and `../source_ios`.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{init::InitArgs, status::StatusArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "pbxsync",
    version,
    about = "Add source files found on disk to an Xcode project",
    long_about = None,
)]
struct Cli {
    /// Log progress to stderr (`-vv` for debug output). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default pbxsync.yaml.
    Init(InitArgs),

    /// Add every untracked source file to the project.
    Sync(SyncArgs),

    /// Show which source files the project is missing.
    Status(StatusArgs),
}

/// Config file flag shared by every subcommand.
#[derive(clap::Args, Debug, Clone)]
pub struct ConfigArg {
    /// Path to the config file.
    #[arg(long, short = 'c', default_value = pbxsync_core::config::CONFIG_FILE)]
    pub config: PathBuf,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_target(false)
        .init();
}

//! `pbxsync sync` — add untracked source files to the project.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use pbxsync_core::{SyncConfig, TargetSelector};
use pbxsync_sync::{sync_project, SyncOptions, SyncReport};

use crate::ConfigArg;

/// Arguments for `pbxsync sync`. Flags override the config file.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// The `.xcodeproj` bundle to update.
    #[arg(long, short = 'p')]
    pub project: Option<PathBuf>,

    /// Directory to scan; repeat for several. Replaces the configured roots.
    #[arg(long = "source-root", value_name = "DIR")]
    pub source_roots: Vec<PathBuf>,

    /// Extra exclude substring; repeat for several.
    #[arg(long = "exclude", value_name = "SUBSTRING")]
    pub excludes: Vec<String>,

    /// Target receiving new files (defaults to the first target).
    #[arg(long, short = 't')]
    pub target: Option<String>,

    /// Report what would be added without saving the project.
    #[arg(long)]
    pub dry_run: bool,

    /// Like `--dry-run`, but fail when any file is untracked.
    #[arg(long)]
    pub check: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let config = self.effective_config()?;
        let options = SyncOptions {
            dry_run: self.dry_run || self.check,
        };
        let report = sync_project(&config, options)
            .with_context(|| format!("sync failed for '{}'", config.project_path.display()))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize sync JSON")?
            );
        } else {
            print_report(&report);
        }

        if self.check && !report.added.is_empty() {
            bail!(
                "{} file(s) are not in '{}'; run `pbxsync sync` to add them",
                report.added.len(),
                report.project_path.display()
            );
        }
        Ok(())
    }

    /// Config file (or defaults) with command-line overrides applied.
    fn effective_config(&self) -> Result<SyncConfig> {
        let mut config = super::load_config(&self.config.config)?;
        if let Some(project) = &self.project {
            config.project_path = project.clone();
        }
        if !self.source_roots.is_empty() {
            config.source_roots = self.source_roots.clone();
        }
        config.exclude_patterns.extend(self.excludes.iter().cloned());
        if let Some(name) = &self.target {
            config.target = TargetSelector::Named(name.clone());
        }
        let cwd = std::env::current_dir().context("could not determine working directory")?;
        Ok(config.resolve(&cwd))
    }
}

fn print_report(report: &SyncReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    for added in &report.added {
        println!("{prefix}Copied over {}", added.full_path.display());
    }

    let project = report.project_path.display();
    if report.added.is_empty() {
        println!(
            "{prefix}{} '{project}' is up to date ({} tracked, {} excluded)",
            "✓".green().bold(),
            report.already_tracked,
            report.excluded.len()
        );
        return;
    }

    let verb = if report.dry_run { "would add" } else { "added" };
    println!(
        "{prefix}{} {verb} {} file(s) to '{project}'{} ({} already tracked, {} excluded)",
        "✓".green().bold(),
        report.added.len(),
        report
            .target
            .as_deref()
            .map(|t| format!(" [{}]", t.bold()))
            .unwrap_or_default(),
        report.already_tracked,
        report.excluded.len()
    );
}

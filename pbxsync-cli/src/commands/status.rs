//! `pbxsync status` — what a sync would add, without touching the project.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pbxsync_sync::{plan_project, SyncPlan};
use serde::Serialize;

use crate::ConfigArg;

/// Arguments for `pbxsync status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let config = super::load_config(&self.config.config)?;
        let plan = plan_project(&config)
            .with_context(|| format!("status failed for '{}'", config.project_path.display()))?;

        if self.json {
            print_json(&plan)?;
        } else {
            print_summary(&plan);
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct StatusJson<'a> {
    summary: StatusSummaryJson,
    #[serde(flatten)]
    plan: &'a SyncPlan,
}

#[derive(Serialize)]
struct StatusSummaryJson {
    current: bool,
    tracked: usize,
    untracked: usize,
    excluded: usize,
}

fn print_json(plan: &SyncPlan) -> Result<()> {
    let payload = StatusJson {
        summary: StatusSummaryJson {
            current: plan.is_current(),
            tracked: plan.tracked.len(),
            untracked: plan.untracked.len(),
            excluded: plan.excluded.len(),
        },
        plan,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_summary(plan: &SyncPlan) {
    println!(
        "pbxsync v{} | {} | {} references",
        env!("CARGO_PKG_VERSION"),
        plan.project_path.display(),
        plan.references,
    );
    println!(
        "{} tracked  {} untracked  {} excluded",
        plan.tracked.len().to_string().green().bold(),
        plan.untracked.len().to_string().yellow().bold(),
        plan.excluded.len().to_string().bright_black().bold(),
    );

    if plan.is_current() {
        println!("{} up to date", "■".green().bold());
        return;
    }
    for candidate in &plan.untracked {
        println!("  {}  {}", "+".yellow(), candidate.full_path.display());
    }
    println!("Run 'pbxsync sync' to add them.");
}

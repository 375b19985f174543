//! `pbxsync init [--config FILE] [--force]`

use anyhow::{Context, Result};
use clap::Args;
use pbxsync_core::SyncConfig;

use crate::ConfigArg;

/// Write a config file holding the defaults.
#[derive(Args, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Replace an existing config file.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let path = &self.config.config;
        if self.force && path.exists() {
            std::fs::remove_file(path)
                .with_context(|| format!("failed to remove '{}'", path.display()))?;
        }
        SyncConfig::write_default(path).with_context(|| {
            format!(
                "failed to write '{}' (use --force to replace it)",
                path.display()
            )
        })?;

        println!("✓ Wrote {}", path.display());
        println!("  Paths are resolved relative to the file's directory.");
        Ok(())
    }
}

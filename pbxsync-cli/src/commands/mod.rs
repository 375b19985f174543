pub mod init;
pub mod status;
pub mod sync;

use std::path::Path;

use anyhow::{Context, Result};
use pbxsync_core::SyncConfig;

/// Load `config_path`, or fall back to the defaults anchored at the working
/// directory when the file is absent.
pub(crate) fn load_config(config_path: &Path) -> Result<SyncConfig> {
    let cwd = std::env::current_dir().context("could not determine working directory")?;
    let (config, found) = SyncConfig::load_or_default(config_path, &cwd)
        .with_context(|| format!("failed to load config '{}'", config_path.display()))?;
    if found {
        tracing::debug!("using config {}", config_path.display());
    }
    Ok(config)
}

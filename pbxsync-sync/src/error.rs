//! Error types for pbxsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use pbxsync_core::{ConfigError, ProjectError};

/// All errors that can arise from a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Loading, mutating, or saving the project manifest failed.
    #[error("project error: {0}")]
    Project(#[from] ProjectError),

    /// Reading `pbxsync.yaml` failed.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Directory traversal failed below a source root.
    #[error("failed to scan {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A candidate does not live under the directory group chains start from.
    #[error("{path} is not under the relation root {root}")]
    OutsideRelationRoot { path: PathBuf, root: PathBuf },

    /// No relative path exists between a candidate and the project directory
    /// (one is absolute and the other relative).
    #[error("cannot express {path} relative to {base}")]
    UnrelatedPaths { path: PathBuf, base: PathBuf },

    /// The group chain for a candidate resolves somewhere else, so the new
    /// reference would never be recognised as tracked.
    #[error("a reference for {path} would resolve to {}", .resolved.as_ref().map_or("nothing".into(), |p| p.display().to_string()))]
    Misplaced {
        path: PathBuf,
        resolved: Option<PathBuf>,
    },
}

/// Convenience constructor for [`SyncError::Walk`].
pub(crate) fn walk_err(root: impl Into<PathBuf>, source: walkdir::Error) -> SyncError {
    SyncError::Walk {
        root: root.into(),
        source,
    }
}

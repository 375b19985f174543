//! Error types for pbxsync-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ObjectId;

/// All errors that can arise from loading, mutating, or saving a project.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// The `project.pbxproj` manifest did not exist at the expected path.
    #[error("project manifest not found at {path}")]
    NotFound { path: PathBuf },

    /// The manifest exists but is not a readable property list.
    #[error("failed to parse project manifest at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: plist::Error,
    },

    /// The manifest parsed but lacks the structure every project carries.
    #[error("malformed project manifest at {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// An object id referenced from the graph has no entry in `objects`.
    #[error("object {id} is missing from the project")]
    MissingObject { id: ObjectId },

    /// An object exists but is not of the kind the operation expected.
    #[error("object {id} is a {found}, expected {expected}")]
    UnexpectedIsa {
        id: ObjectId,
        expected: &'static str,
        found: String,
    },

    /// The project declares no targets at all.
    #[error("project has no targets")]
    NoTargets,

    /// No target carries the requested name.
    #[error("no target named '{name}' in project")]
    TargetNotFound { name: String },

    /// Writing the manifest (or its `.tmp` sibling) failed.
    #[error("failed to save project manifest at {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Property-list serialization error (save path).
    #[error("plist serialization error: {0}")]
    Serialize(#[source] plist::Error),
}

impl ProjectError {
    /// True for the failures that happen while opening a manifest.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            ProjectError::NotFound { .. }
                | ProjectError::Parse { .. }
                | ProjectError::Malformed { .. }
        )
    }

    /// True for the failures that happen while persisting a manifest.
    pub fn is_save_error(&self) -> bool {
        matches!(self, ProjectError::Save { .. } | ProjectError::Serialize(_))
    }
}

/// Errors from reading or writing `pbxsync.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the file path.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The config file did not exist.
    #[error("config not found at {path}")]
    NotFound { path: PathBuf },

    /// `write_default` refused to clobber an existing file.
    #[error("config already exists at {path}")]
    AlreadyExists { path: PathBuf },
}

/// Convenience constructor for [`ProjectError::Save`].
pub(crate) fn save_err(path: impl Into<PathBuf>, source: std::io::Error) -> ProjectError {
    ProjectError::Save {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn config_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}

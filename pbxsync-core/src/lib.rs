//! pbxsync core library — manifest model, configuration, errors.
//!
//! Public API surface:
//! - [`types`] — object ids and read-only views
//! - [`error`] — [`ProjectError`], [`ConfigError`]
//! - [`project`] — open / mutate / save a `project.pbxproj`
//! - [`config`] — [`SyncConfig`] loaded from `pbxsync.yaml`

pub mod config;
pub mod error;
pub mod project;
pub mod types;

pub use config::SyncConfig;
pub use error::{ConfigError, ProjectError};
pub use project::Project;
pub use types::{FileReference, ObjectId, SourceTree, Target, TargetSelector};

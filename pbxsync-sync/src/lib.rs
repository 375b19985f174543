//! # pbxsync-sync
//!
//! Scans source roots and adds every untracked file to a project manifest,
//! mirroring the on-disk folder layout as groups.
//!
//! Call [`sync_project`] for a full load → insert → save run, [`sync_into`]
//! to operate on an already-open [`pbxsync_core::Project`], or
//! [`plan_project`] for a read-only preview.

pub mod error;
pub mod plan;
pub mod scanner;
pub mod synchronizer;

pub use error::SyncError;
pub use plan::{plan_project, SyncPlan};
pub use scanner::{collect_candidates, Candidate};
pub use synchronizer::{sync_into, sync_project, AddedFile, SyncOptions, SyncOutcome, SyncReport};

//! Read-only sync preview for `pbxsync status`.
//!
//! Partitions the current candidates into tracked, untracked, and excluded
//! without mutating the manifest.

use std::path::PathBuf;

use pbxsync_core::{Project, SyncConfig};
use serde::Serialize;

use crate::error::SyncError;
use crate::scanner::{collect_candidates, Candidate};
use crate::synchronizer::tracked_paths;

/// What a sync run would see.
#[derive(Debug, Clone, Serialize)]
pub struct SyncPlan {
    pub project_path: PathBuf,
    /// Number of file references the project already holds.
    pub references: usize,
    pub tracked: Vec<Candidate>,
    pub untracked: Vec<Candidate>,
    pub excluded: Vec<PathBuf>,
}

impl SyncPlan {
    /// True when a sync would not add anything.
    pub fn is_current(&self) -> bool {
        self.untracked.is_empty()
    }
}

/// Compute the plan for `config` without touching the manifest.
pub fn plan_project(config: &SyncConfig) -> Result<SyncPlan, SyncError> {
    let project = Project::open(&config.project_path)?;
    let set = collect_candidates(config, &project.project_dir())?;
    let known = tracked_paths(&project)?;

    let mut tracked = Vec::new();
    let mut untracked: Vec<Candidate> = Vec::new();
    for candidate in set.candidates {
        if known.contains(&candidate.full_path) || known.contains(&candidate.path) {
            tracked.push(candidate);
        } else if !untracked.iter().any(|c| c.full_path == candidate.full_path) {
            untracked.push(candidate);
        }
    }

    Ok(SyncPlan {
        project_path: config.project_path.clone(),
        references: known.len(),
        tracked,
        untracked,
        excluded: set.excluded,
    })
}

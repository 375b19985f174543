//! Project synchronizer.
//!
//! ## `sync_project` flow
//!
//! 1. Open the manifest.
//! 2. Scan source roots; drop excluded candidates.
//! 3. Skip candidates whose full path an existing reference already resolves to.
//! 4. Walk/create the group chain, add a file reference, attach it to the
//!    target's compile-sources phase.
//! 5. Save the manifest (skipped in dry-run).
//!
//! Mutation is additive only. Nothing is persisted until step 5, so any
//! failure before it leaves the on-disk manifest untouched.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use pbxsync_core::{ObjectId, Project, SyncConfig, Target};
use serde::Serialize;

use crate::error::SyncError;
use crate::scanner::{collect_candidates, Candidate};

/// Options for a sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Mutate in memory and report, but never save.
    pub dry_run: bool,
}

/// A file reference added during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddedFile {
    /// Location relative to the project directory.
    pub full_path: PathBuf,
    /// Group names below the main group, outermost first.
    pub groups: Vec<String>,
    /// Bare file name stored on the reference.
    pub file_name: String,
}

/// In-memory result of [`sync_into`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub added: Vec<AddedFile>,
    pub already_tracked: usize,
    /// Name of the target that received files, if any were added.
    pub target: Option<String>,
}

/// Outcome of a full [`sync_project`] run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub project_path: PathBuf,
    pub target: Option<String>,
    pub added: Vec<AddedFile>,
    pub already_tracked: usize,
    pub excluded: Vec<PathBuf>,
    pub dry_run: bool,
    pub saved: bool,
}

/// Bring the project at `config.project_path` into agreement with the
/// configured source roots.
///
/// The project is re-saved even when nothing was added, unless `dry_run`.
pub fn sync_project(config: &SyncConfig, options: SyncOptions) -> Result<SyncReport, SyncError> {
    let mut project = Project::open(&config.project_path)?;
    let set = collect_candidates(config, &project.project_dir())?;
    let outcome = sync_into(&mut project, config, &set.candidates)?;

    let saved = if options.dry_run {
        tracing::info!(
            "[dry-run] would add {} file(s) to {}",
            outcome.added.len(),
            config.project_path.display()
        );
        false
    } else {
        project.save()?;
        tracing::info!("saved {}", config.project_path.display());
        true
    };

    Ok(SyncReport {
        project_path: config.project_path.clone(),
        target: outcome.target,
        added: outcome.added,
        already_tracked: outcome.already_tracked,
        excluded: set.excluded,
        dry_run: options.dry_run,
        saved,
    })
}

/// Insert every untracked candidate into `project`, in order.
///
/// The target is resolved on the first insertion, so a project with no
/// targets only fails when there is something to add.
pub fn sync_into(
    project: &mut Project,
    config: &SyncConfig,
    candidates: &[Candidate],
) -> Result<SyncOutcome, SyncError> {
    let mut tracked = tracked_paths(project)?;
    let mut selected: Option<Target> = None;
    let mut outcome = SyncOutcome::default();

    for candidate in candidates {
        if tracked.contains(&candidate.full_path) || tracked.contains(&candidate.path) {
            tracing::debug!("already tracked: {}", candidate.full_path.display());
            outcome.already_tracked += 1;
            continue;
        }

        let target = match &selected {
            Some(t) => t.id.clone(),
            None => {
                let t = project.select_target(&config.target)?;
                let id = t.id.clone();
                selected = Some(t);
                id
            }
        };

        let groups = candidate.group_chain(&config.group_prefix);
        let (group, group_dir) = place_groups(project, config.group_prefix.len(), &groups, candidate)?;

        let file_name = candidate.file_name();
        let resolved = group_dir.map(|dir| dir.join(&file_name));
        if resolved.as_deref() != Some(candidate.full_path.as_path()) {
            return Err(SyncError::Misplaced {
                path: candidate.full_path.clone(),
                resolved,
            });
        }
        let file_ref = project.new_file(&group, &file_name)?;
        project.add_to_compile_sources(&target, &file_ref)?;

        tracing::info!("Copied over {}", candidate.full_path.display());
        tracked.insert(candidate.full_path.clone());
        outcome.added.push(AddedFile {
            full_path: candidate.full_path.clone(),
            groups,
            file_name,
        });
    }

    outcome.target = selected.map(|t| t.name);
    Ok(outcome)
}

/// Walk or create `groups` below the main group, returning the last group
/// and the directory it resolves to.
///
/// A created group stores the path that makes it resolve to the directory it
/// stands for: the last prefix group points at the relation root, earlier
/// prefix groups store no path, and folder groups add their own segment.
/// Existing groups are reused as they are.
fn place_groups(
    project: &mut Project,
    prefix_len: usize,
    groups: &[String],
    candidate: &Candidate,
) -> Result<(ObjectId, Option<PathBuf>), SyncError> {
    let file_dir = candidate.full_path.parent().unwrap_or(Path::new(""));
    let folders = groups.len() - prefix_len;

    let mut group = project.main_group().clone();
    let mut dir = project.main_group_path()?;
    for (level, name) in groups.iter().enumerate() {
        let want = if level + 1 < prefix_len {
            dir.clone()
        } else {
            let up = folders + prefix_len - 1 - level;
            file_dir.ancestors().nth(up).map(Path::to_path_buf)
        };
        let stored = match (&dir, &want) {
            (Some(have), Some(want)) => pathdiff::diff_paths(want, have),
            _ => None,
        };
        group = match stored {
            Some(path) => project.get_or_create_child_group_at(&group, name, &path.to_string_lossy())?,
            None => project.get_or_create_child_group(&group, name)?,
        };
        dir = project.resolve_child(&group, dir.as_deref())?;
    }
    Ok((group, dir))
}

/// Resolved full paths of every file reference in the project.
pub(crate) fn tracked_paths(project: &Project) -> Result<HashSet<PathBuf>, SyncError> {
    Ok(project
        .file_references()?
        .into_iter()
        .filter_map(|f| f.full_path)
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

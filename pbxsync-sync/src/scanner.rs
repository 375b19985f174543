//! Candidate discovery.
//!
//! Walks each source root with `walkdir`, keeps files whose extension is in
//! the configured set, drops anything matching the exclude denylist, and
//! computes the two paths the synchronizer needs for each survivor:
//!
//! - `relative` — below the relation root; its segments become the group chain.
//! - `full_path` — relative to the project directory; compared against the
//!   resolved paths of existing file references.
//!
//! Discovery order is preserved; nothing is sorted.

use std::path::{Path, PathBuf};

use pbxsync_core::SyncConfig;
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{walk_err, SyncError};

/// A file discovered during one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Location as discovered (source root joined with the walked suffix).
    pub path: PathBuf,
    /// Location below the relation root.
    pub relative: PathBuf,
    /// Location relative to the project directory.
    pub full_path: PathBuf,
}

impl Candidate {
    /// Group names from the main group down to the file's parent.
    pub fn group_chain(&self, prefix: &[String]) -> Vec<String> {
        let mut chain = prefix.to_vec();
        if let Some(parent) = self.relative.parent() {
            chain.extend(
                parent
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned()),
            );
        }
        chain
    }

    /// The bare file name the new reference stores as its path.
    pub fn file_name(&self) -> String {
        self.relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Candidates that survived filtering, plus the paths the denylist rejected.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    pub candidates: Vec<Candidate>,
    pub excluded: Vec<PathBuf>,
}

/// Every file below `roots` whose extension is in `extensions`, in walk order.
///
/// A root that does not exist contributes nothing.
pub fn scan(roots: &[PathBuf], extensions: &[String]) -> Result<Vec<PathBuf>, SyncError> {
    let mut out = Vec::new();
    for root in roots {
        if !root.exists() {
            tracing::warn!("source root {} does not exist; skipping", root.display());
            continue;
        }
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| walk_err(root, e))?;
            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }
            let matches = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| extensions.iter().any(|want| want == ext));
            if matches {
                out.push(entry.into_path());
            }
        }
    }
    tracing::debug!("scanned {} root(s), {} file(s)", roots.len(), out.len());
    Ok(out)
}

/// Case-sensitive substring denylist.
pub fn is_excluded(display_path: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|p| display_path.contains(p.as_str()))
}

/// Scan, filter, and compute paths for every candidate under `config`.
///
/// The denylist is checked against the path below the relation root (or the
/// discovered path when it lies outside); excluded files are never inspected
/// further. A surviving file outside the relation root aborts the run.
pub fn collect_candidates(config: &SyncConfig, project_dir: &Path) -> Result<CandidateSet, SyncError> {
    let relation_root = config.effective_relation_root();
    let mut set = CandidateSet::default();

    for path in scan(&config.source_roots, &config.extensions)? {
        let relative = path.strip_prefix(&relation_root).ok().map(Path::to_path_buf);
        let display = relative.as_deref().unwrap_or(path.as_path()).to_string_lossy().into_owned();
        if is_excluded(&display, &config.exclude_patterns) {
            tracing::debug!("excluded {display}");
            set.excluded.push(path);
            continue;
        }

        let Some(relative) = relative else {
            return Err(SyncError::OutsideRelationRoot {
                path,
                root: relation_root,
            });
        };
        let full_path = pathdiff::diff_paths(&path, project_dir).ok_or_else(|| {
            SyncError::UnrelatedPaths {
                path: path.clone(),
                base: project_dir.to_path_buf(),
            }
        })?;
        set.candidates.push(Candidate {
            path,
            relative,
            full_path,
        });
    }
    Ok(set)
}

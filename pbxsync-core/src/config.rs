//! Sync configuration (`pbxsync.yaml`).
//!
//! Every key is optional; missing keys fall back to [`SyncConfig::default`].
//! Relative paths are resolved against the directory holding the config file
//! (or the working directory when there is no file) by [`SyncConfig::resolve`],
//! then cleaned lexically so `a/../b` becomes `b`.
//!
//! ```yaml
//! project_path: ../prebuilt_ios/PredatorsIOS/PredatorsIOS.xcodeproj
//! source_roots: [../source_common, ../source_ios]
//! extensions: [cpp, h, m, mm]
//! exclude_patterns: [imgui, main.cpp]
//! target: first            # or `target: { name: PredatorsIOS }`
//! relation_root: ..
//! group_prefix: [PredatorsIOS]
//! ```

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{config_io_err, ConfigError};
use crate::types::TargetSelector;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "pbxsync.yaml";

/// Explicit configuration for one sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// The `.xcodeproj` bundle to update.
    pub project_path: PathBuf,
    /// Directories scanned recursively for candidates.
    pub source_roots: Vec<PathBuf>,
    /// Accepted file extensions, without the dot.
    pub extensions: Vec<String>,
    /// Candidates whose path contains any of these substrings are skipped.
    pub exclude_patterns: Vec<String>,
    /// Target whose compile-sources phase receives new files.
    pub target: TargetSelector,
    /// Directory the group chain is computed from. Defaults to the project
    /// directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_root: Option<PathBuf>,
    /// Group names prepended to every chain, below the main group.
    pub group_prefix: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            project_path: PathBuf::from("../prebuilt_ios/PredatorsIOS/PredatorsIOS.xcodeproj"),
            source_roots: vec![
                PathBuf::from("../source_common"),
                PathBuf::from("../source_ios"),
            ],
            extensions: ["cpp", "h", "m", "mm"].map(String::from).to_vec(),
            exclude_patterns: ["imgui", "main.cpp"].map(String::from).to_vec(),
            target: TargetSelector::First,
            relation_root: Some(PathBuf::from("..")),
            group_prefix: vec!["PredatorsIOS".to_string()],
        }
    }
}

impl SyncConfig {
    /// Load `path` and resolve its relative paths against the file's directory.
    ///
    /// Returns `ConfigError::NotFound` if absent,
    /// `ConfigError::Parse` (with path) if the YAML is malformed.
    pub fn load(path: &Path) -> Result<SyncConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path).map_err(|e| config_io_err(path, e))?;
        let config: SyncConfig = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        let base = path.parent().unwrap_or(Path::new(""));
        Ok(config.resolve(base))
    }

    /// Load `path` if it exists, otherwise fall back to the defaults resolved
    /// against `fallback_base`. The flag reports whether a file was read.
    pub fn load_or_default(path: &Path, fallback_base: &Path) -> Result<(SyncConfig, bool), ConfigError> {
        match Self::load(path) {
            Ok(config) => Ok((config, true)),
            Err(ConfigError::NotFound { .. }) => {
                tracing::debug!("no config at {}; using defaults", path.display());
                Ok((SyncConfig::default().resolve(fallback_base), false))
            }
            Err(e) => Err(e),
        }
    }

    /// Anchor every relative path at `base`; absolute paths are kept.
    pub fn resolve(mut self, base: &Path) -> SyncConfig {
        self.project_path = anchor(base, &self.project_path);
        self.source_roots = self.source_roots.iter().map(|r| anchor(base, r)).collect();
        self.relation_root = self.relation_root.as_deref().map(|r| anchor(base, r));
        self
    }

    /// The directory the group chain is computed from.
    pub fn effective_relation_root(&self) -> PathBuf {
        match &self.relation_root {
            Some(root) => root.clone(),
            None => self
                .project_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }

    /// Write the defaults to `path`, refusing to overwrite an existing file.
    pub fn write_default(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }
        let yaml = serde_yaml::to_string(&SyncConfig::default())?;
        std::fs::write(path, yaml).map_err(|e| config_io_err(path, e))?;
        Ok(())
    }
}

fn anchor(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || base.as_os_str().is_empty() {
        clean(path)
    } else {
        clean(&base.join(path))
    }
}

/// Drop `.` segments and fold `name/..` pairs. Leading `..` segments of a
/// relative path are kept; symlinks are not consulted.
fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().map(|c| c.as_os_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config: SyncConfig = serde_yaml::from_str("{}").expect("parse");
        assert_eq!(config, SyncConfig::default());
        assert_eq!(config.exclude_patterns, vec!["imgui", "main.cpp"]);
        assert_eq!(config.extensions, vec!["cpp", "h", "m", "mm"]);
    }

    #[test]
    fn load_resolves_against_config_dir() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "project_path: ios/App.xcodeproj\nsource_roots: [src, /abs/lib]\ntarget:\n  name: App\n",
        )
        .expect("write");

        let config = SyncConfig::load(&path).expect("load");
        assert_eq!(config.project_path, dir.path().join("ios/App.xcodeproj"));
        assert_eq!(
            config.source_roots,
            vec![dir.path().join("src"), PathBuf::from("/abs/lib")]
        );
        assert_eq!(config.target, TargetSelector::Named("App".into()));
    }

    #[test]
    fn relation_root_defaults_to_project_dir_when_unset() {
        let config = SyncConfig {
            project_path: PathBuf::from("/repo/ios/App.xcodeproj"),
            relation_root: None,
            ..SyncConfig::default()
        };
        assert_eq!(config.effective_relation_root(), PathBuf::from("/repo/ios"));
    }

    #[test]
    fn load_or_default_reports_missing_file() {
        let dir = TempDir::new().expect("tempdir");
        let (config, found) =
            SyncConfig::load_or_default(&dir.path().join(CONFIG_FILE), dir.path()).expect("load");
        assert!(!found);
        let parent = dir.path().parent().expect("tempdir has a parent");
        assert_eq!(config.relation_root.as_deref(), Some(parent));
    }

    #[test]
    fn clean_folds_parent_segments() {
        assert_eq!(clean(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(clean(Path::new("../x/../y")), PathBuf::from("../y"));
        assert_eq!(clean(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "source_roots: {unclosed").expect("write");
        let err = SyncConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    }

    #[test]
    fn write_default_refuses_to_overwrite() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        SyncConfig::write_default(&path).expect("first write");
        let err = SyncConfig::write_default(&path).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists { .. }));
    }
}

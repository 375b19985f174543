//! Domain types for the project manifest.
//!
//! All path fields use `PathBuf`; object ids are a newtype over the 24-character
//! hex strings the manifest uses as keys.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed key into the manifest's `objects` table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub String);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ObjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Object kinds
// ---------------------------------------------------------------------------

/// `isa` values the tool reads or writes.
pub mod isa {
    pub const PROJECT: &str = "PBXProject";
    pub const GROUP: &str = "PBXGroup";
    pub const FILE_REFERENCE: &str = "PBXFileReference";
    pub const BUILD_FILE: &str = "PBXBuildFile";
    pub const NATIVE_TARGET: &str = "PBXNativeTarget";
    pub const SOURCES_BUILD_PHASE: &str = "PBXSourcesBuildPhase";
    pub const CONFIGURATION_LIST: &str = "XCConfigurationList";
    pub const BUILD_CONFIGURATION: &str = "XCBuildConfiguration";
}

/// How a group or file reference's `path` is anchored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceTree {
    /// `<group>` — relative to the enclosing group.
    Group,
    /// `SOURCE_ROOT` — relative to the project directory.
    SourceRoot,
    /// `<absolute>` — an absolute filesystem path.
    Absolute,
    /// Build-setting anchored (`SDKROOT`, `BUILT_PRODUCTS_DIR`, ...).
    Other(String),
}

impl SourceTree {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "<group>" => SourceTree::Group,
            "SOURCE_ROOT" => SourceTree::SourceRoot,
            "<absolute>" => SourceTree::Absolute,
            other => SourceTree::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SourceTree::Group => "<group>",
            SourceTree::SourceRoot => "SOURCE_ROOT",
            SourceTree::Absolute => "<absolute>",
            SourceTree::Other(s) => s,
        }
    }
}

impl fmt::Display for SourceTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// A file reference reachable from the main group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    pub id: ObjectId,
    /// The stored `path` attribute (a bare file name for references this tool adds).
    pub path: String,
    /// Group that lists this reference among its children.
    pub parent: ObjectId,
    /// Display names of the enclosing groups below the main group, outermost first.
    pub group_names: Vec<String>,
    /// Resolved location, relative to the project directory unless the
    /// reference is absolute. `None` when anchored to a build setting.
    pub full_path: Option<PathBuf>,
}

/// A build target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub id: ObjectId,
    pub name: String,
}

/// Which target's compile-sources phase receives new files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetSelector {
    /// The first target the project declares.
    #[default]
    First,
    /// The target with this exact name.
    #[serde(rename = "name")]
    Named(String),
}

impl fmt::Display for TargetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSelector::First => write!(f, "first target"),
            TargetSelector::Named(name) => write!(f, "target '{name}'"),
        }
    }
}

/// `lastKnownFileType` for a source file, keyed by extension.
pub fn last_known_file_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("cpp") | Some("cc") | Some("cxx") => "sourcecode.cpp.cpp",
        Some("hpp") => "sourcecode.cpp.h",
        Some("h") => "sourcecode.c.h",
        Some("c") => "sourcecode.c.c",
        Some("m") => "sourcecode.c.objc",
        Some("mm") => "sourcecode.cpp.objcpp",
        Some("swift") => "sourcecode.swift",
        _ => "text",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

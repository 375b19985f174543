//! The `project.pbxproj` object graph.
//!
//! # Storage layout
//!
//! ```text
//! <base>/
//!   App.xcodeproj/
//!     project.pbxproj      (property list: archiveVersion, objects, rootObject, ...)
//!     project.pbxproj.tmp  (transient, only during save)
//! ```
//!
//! The manifest is kept as a raw `plist::Dictionary` so that attributes this
//! crate never touches (build settings, schemes, ...) survive a load/save
//! cycle. Typed accessors read and mutate only the handful of object kinds
//! the synchronizer needs.
//!
//! Input may be any format the `plist` crate reads; output is always XML,
//! which Xcode opens and rewrites in its own format on the next edit.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use plist::{Dictionary, Value};
use sha2::{Digest, Sha256};

use crate::error::{save_err, ProjectError};
use crate::types::{
    isa, last_known_file_type, FileReference, ObjectId, SourceTree, Target, TargetSelector,
};

const MANIFEST_FILE: &str = "project.pbxproj";
const OBJECTS_KEY: &str = "objects";
const ROOT_OBJECT_KEY: &str = "rootObject";

/// An open project manifest.
#[derive(Debug, Clone)]
pub struct Project {
    /// The `.xcodeproj` bundle directory.
    path: PathBuf,
    /// Top-level keys in their original order; `objects` is an empty placeholder.
    header: Dictionary,
    objects: Dictionary,
    root_object: ObjectId,
    main_group: ObjectId,
    id_counter: u64,
}

/// `<bundle>/project.pbxproj` — pure, no I/O.
pub fn manifest_path(bundle: &Path) -> PathBuf {
    bundle.join(MANIFEST_FILE)
}

// ---------------------------------------------------------------------------
// 1. Load / create
// ---------------------------------------------------------------------------

impl Project {
    /// Open the manifest inside the `.xcodeproj` bundle at `path`.
    ///
    /// Returns `ProjectError::NotFound` if the manifest is absent,
    /// `ProjectError::Parse` if it is not a property list, and
    /// `ProjectError::Malformed` if the graph lacks its root object or main group.
    pub fn open(path: impl AsRef<Path>) -> Result<Project, ProjectError> {
        let path = path.as_ref().to_path_buf();
        let manifest = manifest_path(&path);
        if !manifest.is_file() {
            return Err(ProjectError::NotFound { path: manifest });
        }
        let value = Value::from_file(&manifest).map_err(|e| ProjectError::Parse {
            path: manifest.clone(),
            source: e,
        })?;
        let project = Self::from_value(path, value)?;
        tracing::debug!(
            "opened {} ({} objects)",
            manifest.display(),
            project.objects.len()
        );
        Ok(project)
    }

    /// Build a project from an already-parsed manifest value.
    pub fn from_value(path: PathBuf, value: Value) -> Result<Project, ProjectError> {
        let manifest = manifest_path(&path);
        let malformed = |reason: &str| ProjectError::Malformed {
            path: manifest.clone(),
            reason: reason.to_owned(),
        };

        let Value::Dictionary(mut header) = value else {
            return Err(malformed("top level is not a dictionary"));
        };
        let objects = match header.get_mut(OBJECTS_KEY) {
            Some(Value::Dictionary(objects)) => std::mem::take(objects),
            Some(_) => return Err(malformed("`objects` is not a dictionary")),
            None => return Err(malformed("missing `objects`")),
        };
        let root_object = header
            .get(ROOT_OBJECT_KEY)
            .and_then(Value::as_string)
            .map(ObjectId::from)
            .ok_or_else(|| malformed("missing `rootObject`"))?;
        let main_group = objects
            .get(&root_object.0)
            .and_then(Value::as_dictionary)
            .ok_or_else(|| malformed("root object is not in `objects`"))?
            .get("mainGroup")
            .and_then(Value::as_string)
            .map(ObjectId::from)
            .ok_or_else(|| malformed("root object has no `mainGroup`"))?;
        if !objects.contains_key(&main_group.0) {
            return Err(malformed("main group is not in `objects`"));
        }

        Ok(Project {
            path,
            header,
            objects,
            root_object,
            main_group,
            id_counter: 0,
        })
    }

    /// Create a minimal in-memory project with a single application target.
    ///
    /// Nothing touches disk until [`Project::save`].
    pub fn new(path: impl AsRef<Path>, target_name: &str) -> Project {
        let mut header = Dictionary::new();
        header.insert("archiveVersion".into(), Value::String("1".into()));
        header.insert("classes".into(), Value::Dictionary(Dictionary::new()));
        header.insert("objectVersion".into(), Value::String("46".into()));
        header.insert(OBJECTS_KEY.into(), Value::Dictionary(Dictionary::new()));

        let mut project = Project {
            path: path.as_ref().to_path_buf(),
            header,
            objects: Dictionary::new(),
            root_object: ObjectId::from(""),
            main_group: ObjectId::from(""),
            id_counter: 0,
        };

        let main_group = project.insert_object(
            isa::GROUP,
            vec![
                ("children", Value::Array(vec![])),
                ("sourceTree", Value::String(SourceTree::Group.as_str().into())),
            ],
        );
        let project_configs = project.insert_configuration_list();
        let target_configs = project.insert_configuration_list();
        let sources = project.insert_sources_phase();
        let target = project.insert_object(
            isa::NATIVE_TARGET,
            vec![
                ("buildConfigurationList", id_value(&target_configs)),
                ("buildPhases", Value::Array(vec![id_value(&sources)])),
                ("buildRules", Value::Array(vec![])),
                ("dependencies", Value::Array(vec![])),
                ("name", Value::String(target_name.into())),
                ("productName", Value::String(target_name.into())),
                (
                    "productType",
                    Value::String("com.apple.product-type.application".into()),
                ),
            ],
        );
        let root = project.insert_object(
            isa::PROJECT,
            vec![
                ("attributes", Value::Dictionary(Dictionary::new())),
                ("buildConfigurationList", id_value(&project_configs)),
                ("compatibilityVersion", Value::String("Xcode 3.2".into())),
                ("developmentRegion", Value::String("en".into())),
                ("hasScannedForEncodings", Value::String("0".into())),
                ("mainGroup", id_value(&main_group)),
                ("projectDirPath", Value::String(String::new())),
                ("projectRoot", Value::String(String::new())),
                ("targets", Value::Array(vec![id_value(&target)])),
            ],
        );

        project
            .header
            .insert(ROOT_OBJECT_KEY.into(), id_value(&root));
        project.root_object = root;
        project.main_group = main_group;
        project
    }

    fn insert_configuration_list(&mut self) -> ObjectId {
        let configs: Vec<Value> = ["Debug", "Release"]
            .into_iter()
            .map(|name| {
                let id = self.insert_object(
                    isa::BUILD_CONFIGURATION,
                    vec![
                        ("buildSettings", Value::Dictionary(Dictionary::new())),
                        ("name", Value::String(name.into())),
                    ],
                );
                id_value(&id)
            })
            .collect();
        self.insert_object(
            isa::CONFIGURATION_LIST,
            vec![
                ("buildConfigurations", Value::Array(configs)),
                ("defaultConfigurationIsVisible", Value::String("0".into())),
                ("defaultConfigurationName", Value::String("Release".into())),
            ],
        )
    }

    fn insert_sources_phase(&mut self) -> ObjectId {
        self.insert_object(
            isa::SOURCES_BUILD_PHASE,
            vec![
                ("buildActionMask", Value::String("2147483647".into())),
                ("files", Value::Array(vec![])),
                ("runOnlyForDeploymentPostprocessing", Value::String("0".into())),
            ],
        )
    }
}

// ---------------------------------------------------------------------------
// 2. Save (atomic)
// ---------------------------------------------------------------------------

impl Project {
    /// Atomically write the manifest back to the bundle it was opened from.
    pub fn save(&self) -> Result<(), ProjectError> {
        self.save_as(&self.path)
    }

    /// Atomically write the manifest into the bundle directory `path`.
    ///
    /// Write flow: serialize → `project.pbxproj.tmp` → `rename`.
    /// The `.tmp` sibling is removed if the rename fails.
    pub fn save_as(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let bundle = path.as_ref();
        std::fs::create_dir_all(bundle).map_err(|e| save_err(bundle, e))?;
        let target = manifest_path(bundle);
        let tmp = bundle.join(format!("{MANIFEST_FILE}.tmp"));

        let mut buf = Vec::new();
        plist::to_writer_xml(&mut buf, &self.to_dictionary()).map_err(ProjectError::Serialize)?;
        std::fs::write(&tmp, &buf).map_err(|e| save_err(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, &target) {
            let _ = std::fs::remove_file(&tmp);
            return Err(save_err(&target, e));
        }
        tracing::debug!("saved {}", target.display());
        Ok(())
    }

    /// Reassemble the full manifest, keeping the header's key order.
    fn to_dictionary(&self) -> Dictionary {
        let mut out = Dictionary::new();
        for (key, value) in self.header.iter() {
            if key == OBJECTS_KEY {
                out.insert(key.clone(), Value::Dictionary(self.objects.clone()));
            } else {
                out.insert(key.clone(), value.clone());
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// 3. Accessors
// ---------------------------------------------------------------------------

impl Project {
    /// The `.xcodeproj` bundle directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The directory containing the bundle; file references resolve against it.
    pub fn project_dir(&self) -> PathBuf {
        self.path.parent().map(Path::to_path_buf).unwrap_or_default()
    }

    pub fn main_group(&self) -> &ObjectId {
        &self.main_group
    }

    pub fn root_object(&self) -> &ObjectId {
        &self.root_object
    }

    /// Number of objects in the graph.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// The `isa` of an object, if it exists.
    pub fn isa_of(&self, id: &ObjectId) -> Option<&str> {
        self.objects
            .get(&id.0)
            .and_then(Value::as_dictionary)
            .and_then(|o| str_attr(o, "isa"))
    }

    /// Name shown for a group or file: `name`, else the last component of `path`.
    pub fn display_name(&self, id: &ObjectId) -> Result<Option<String>, ProjectError> {
        Ok(display_name_of(self.object(id)?))
    }

    /// Ids listed in a group's `children`, in order.
    pub fn group_children(&self, group: &ObjectId) -> Result<Vec<ObjectId>, ProjectError> {
        Ok(id_list(self.expect_group(group)?, "children"))
    }

    /// The stored `path` attribute of an object.
    pub fn stored_path(&self, id: &ObjectId) -> Result<Option<String>, ProjectError> {
        Ok(str_attr(self.object(id)?, "path").map(str::to_owned))
    }

    fn object(&self, id: &ObjectId) -> Result<&Dictionary, ProjectError> {
        self.objects
            .get(&id.0)
            .and_then(Value::as_dictionary)
            .ok_or_else(|| ProjectError::MissingObject { id: id.clone() })
    }

    fn object_mut(&mut self, id: &ObjectId) -> Result<&mut Dictionary, ProjectError> {
        self.objects
            .get_mut(&id.0)
            .and_then(Value::as_dictionary_mut)
            .ok_or_else(|| ProjectError::MissingObject { id: id.clone() })
    }

    fn expect_isa(&self, id: &ObjectId, expected: &'static str) -> Result<&Dictionary, ProjectError> {
        let obj = self.object(id)?;
        match str_attr(obj, "isa") {
            Some(found) if found == expected => Ok(obj),
            found => Err(ProjectError::UnexpectedIsa {
                id: id.clone(),
                expected,
                found: found.unwrap_or("<none>").to_owned(),
            }),
        }
    }

    fn expect_group(&self, id: &ObjectId) -> Result<&Dictionary, ProjectError> {
        let obj = self.object(id)?;
        match str_attr(obj, "isa") {
            Some(found) if is_group_isa(found) => Ok(obj),
            found => Err(ProjectError::UnexpectedIsa {
                id: id.clone(),
                expected: isa::GROUP,
                found: found.unwrap_or("<none>").to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// 4. Groups and file references
// ---------------------------------------------------------------------------

impl Project {
    /// The child group of `parent` whose display name is `name`.
    ///
    /// File references with a matching name are ignored; dangling child ids
    /// are skipped.
    pub fn child_group(&self, parent: &ObjectId, name: &str) -> Result<Option<ObjectId>, ProjectError> {
        for child in id_list(self.expect_group(parent)?, "children") {
            let Some(obj) = self.objects.get(&child.0).and_then(Value::as_dictionary) else {
                continue;
            };
            if str_attr(obj, "isa").is_some_and(is_group_isa)
                && display_name_of(obj).as_deref() == Some(name)
            {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Return the child group named `name`, creating it when absent.
    ///
    /// A created group stores `path = name` under `<group>`, so its resolved
    /// path is its parent's path plus one segment.
    pub fn get_or_create_child_group(&mut self, parent: &ObjectId, name: &str) -> Result<ObjectId, ProjectError> {
        self.get_or_create_child_group_at(parent, name, name)
    }

    /// Like [`Project::get_or_create_child_group`], but a created group stores
    /// `path` relative to its parent instead of its name.
    ///
    /// An empty `path` makes the group resolve to its parent's directory. When
    /// `path` differs from `name`, the name is stored explicitly. An existing
    /// group is returned as is.
    pub fn get_or_create_child_group_at(
        &mut self,
        parent: &ObjectId,
        name: &str,
        path: &str,
    ) -> Result<ObjectId, ProjectError> {
        if let Some(existing) = self.child_group(parent, name)? {
            return Ok(existing);
        }
        let mut attrs = vec![("children", Value::Array(vec![]))];
        if path != name {
            attrs.push(("name", Value::String(name.into())));
        }
        if !path.is_empty() {
            attrs.push(("path", Value::String(path.into())));
        }
        attrs.push(("sourceTree", Value::String(SourceTree::Group.as_str().into())));
        let id = self.insert_object(isa::GROUP, attrs);
        push_id(self.object_mut(parent)?, "children", &id);
        tracing::debug!("created group '{name}' at '{path}' ({id})");
        Ok(id)
    }

    /// Add a file reference named `file_name` to `group`.
    ///
    /// The stored path is the bare file name, anchored to the group.
    pub fn new_file(&mut self, group: &ObjectId, file_name: &str) -> Result<ObjectId, ProjectError> {
        self.expect_group(group)?;
        let file_type = last_known_file_type(Path::new(file_name));
        let id = self.insert_object(
            isa::FILE_REFERENCE,
            vec![
                ("lastKnownFileType", Value::String(file_type.into())),
                ("path", Value::String(file_name.into())),
                ("sourceTree", Value::String(SourceTree::Group.as_str().into())),
            ],
        );
        push_id(self.object_mut(group)?, "children", &id);
        Ok(id)
    }

    /// Every file reference reachable from the main group, in tree order,
    /// with its resolved full path.
    pub fn file_references(&self) -> Result<Vec<FileReference>, ProjectError> {
        let resolved = self.main_group_path()?;

        let mut out = Vec::new();
        let mut visited = HashSet::from([self.main_group.clone()]);
        self.collect_files(
            &self.main_group,
            resolved.as_deref(),
            &mut Vec::new(),
            &mut visited,
            &mut out,
        )?;
        Ok(out)
    }

    fn collect_files(
        &self,
        group: &ObjectId,
        group_path: Option<&Path>,
        chain: &mut Vec<String>,
        visited: &mut HashSet<ObjectId>,
        out: &mut Vec<FileReference>,
    ) -> Result<(), ProjectError> {
        for child in self.group_children(group)? {
            if !visited.insert(child.clone()) {
                continue;
            }
            let Some(obj) = self.objects.get(&child.0).and_then(Value::as_dictionary) else {
                tracing::warn!("group {group} lists missing child {child}");
                continue;
            };
            let full_path = resolve(obj, group_path);
            match str_attr(obj, "isa") {
                Some(kind) if is_group_isa(kind) => {
                    chain.push(display_name_of(obj).unwrap_or_default());
                    self.collect_files(&child, full_path.as_deref(), chain, visited, out)?;
                    chain.pop();
                }
                Some(isa::FILE_REFERENCE) => out.push(FileReference {
                    path: str_attr(obj, "path").unwrap_or_default().to_owned(),
                    parent: group.clone(),
                    group_names: chain.clone(),
                    full_path,
                    id: child,
                }),
                _ => {}
            }
        }
        Ok(())
    }

    /// Resolved directory of the main group, relative to the project directory.
    ///
    /// The root object's `projectDirPath` is the base (usually empty).
    pub fn main_group_path(&self) -> Result<Option<PathBuf>, ProjectError> {
        let root = self.object(&self.root_object)?;
        let base = PathBuf::from(str_attr(root, "projectDirPath").unwrap_or(""));
        Ok(resolve(self.expect_group(&self.main_group)?, Some(&base)))
    }

    /// Resolved path of `id` when its parent resolves to `parent`.
    ///
    /// `None` when the object is anchored to a build setting or its parent
    /// does not resolve.
    pub fn resolve_child(&self, id: &ObjectId, parent: Option<&Path>) -> Result<Option<PathBuf>, ProjectError> {
        Ok(resolve(self.object(id)?, parent))
    }

    /// The reference whose resolved full path is exactly `full_path`.
    ///
    /// Comparison is lexical; no normalization is applied to either side.
    pub fn find_file_by_full_path(&self, full_path: &Path) -> Result<Option<FileReference>, ProjectError> {
        Ok(self
            .file_references()?
            .into_iter()
            .find(|f| f.full_path.as_deref() == Some(full_path)))
    }
}

// ---------------------------------------------------------------------------
// 5. Targets and build phases
// ---------------------------------------------------------------------------

impl Project {
    /// Targets in declaration order.
    pub fn targets(&self) -> Result<Vec<Target>, ProjectError> {
        let root = self.object(&self.root_object)?;
        id_list(root, "targets")
            .into_iter()
            .map(|id| {
                let name = str_attr(self.object(&id)?, "name").unwrap_or_default().to_owned();
                Ok(Target { id, name })
            })
            .collect()
    }

    pub fn select_target(&self, selector: &TargetSelector) -> Result<Target, ProjectError> {
        let targets = self.targets()?;
        match selector {
            TargetSelector::First => targets.into_iter().next().ok_or(ProjectError::NoTargets),
            TargetSelector::Named(name) => targets
                .into_iter()
                .find(|t| &t.name == name)
                .ok_or_else(|| ProjectError::TargetNotFound { name: name.clone() }),
        }
    }

    /// The target's `PBXSourcesBuildPhase`, if it has one.
    pub fn sources_phase(&self, target: &ObjectId) -> Result<Option<ObjectId>, ProjectError> {
        let phases = id_list(self.object(target)?, "buildPhases");
        Ok(phases
            .into_iter()
            .find(|id| self.isa_of(id) == Some(isa::SOURCES_BUILD_PHASE)))
    }

    /// Append `file_ref` to the target's compile-sources phase.
    ///
    /// Creates and attaches the phase if the target has none. Returns the id of
    /// the new `PBXBuildFile`.
    pub fn add_to_compile_sources(&mut self, target: &ObjectId, file_ref: &ObjectId) -> Result<ObjectId, ProjectError> {
        self.expect_isa(file_ref, isa::FILE_REFERENCE)?;
        let phase = match self.sources_phase(target)? {
            Some(phase) => phase,
            None => {
                let phase = self.insert_sources_phase();
                push_id(self.object_mut(target)?, "buildPhases", &phase);
                phase
            }
        };
        let build_file = self.insert_object(isa::BUILD_FILE, vec![("fileRef", id_value(file_ref))]);
        push_id(self.object_mut(&phase)?, "files", &build_file);
        Ok(build_file)
    }

    /// File references compiled by the target, in phase order.
    pub fn compile_sources(&self, target: &ObjectId) -> Result<Vec<ObjectId>, ProjectError> {
        let Some(phase) = self.sources_phase(target)? else {
            return Ok(vec![]);
        };
        Ok(id_list(self.object(&phase)?, "files")
            .into_iter()
            .filter_map(|bf| {
                self.objects
                    .get(&bf.0)
                    .and_then(Value::as_dictionary)
                    .and_then(|o| str_attr(o, "fileRef"))
                    .map(ObjectId::from)
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// 6. Object creation
// ---------------------------------------------------------------------------

impl Project {
    fn insert_object(&mut self, kind: &str, attrs: Vec<(&str, Value)>) -> ObjectId {
        let id = self.generate_id(kind);
        let mut obj = Dictionary::new();
        obj.insert("isa".into(), Value::String(kind.into()));
        for (key, value) in attrs {
            obj.insert(key.into(), value);
        }
        self.objects.insert(id.0.clone(), Value::Dictionary(obj));
        id
    }

    /// 24 upper-case hex characters, unique within this project.
    fn generate_id(&mut self, kind: &str) -> ObjectId {
        loop {
            self.id_counter += 1;
            let mut h = Sha256::new();
            h.update(self.path.to_string_lossy().as_bytes());
            h.update(kind.as_bytes());
            h.update(self.id_counter.to_le_bytes());
            let id = hex::encode_upper(&h.finalize()[..12]);
            if !self.objects.contains_key(&id) {
                return ObjectId(id);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn is_group_isa(kind: &str) -> bool {
    matches!(kind, "PBXGroup" | "PBXVariantGroup" | "XCVersionGroup")
}

fn str_attr<'a>(obj: &'a Dictionary, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_string)
}

fn id_value(id: &ObjectId) -> Value {
    Value::String(id.0.clone())
}

fn id_list(obj: &Dictionary, key: &str) -> Vec<ObjectId> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_string)
                .map(ObjectId::from)
                .collect()
        })
        .unwrap_or_default()
}

fn push_id(obj: &mut Dictionary, key: &str, id: &ObjectId) {
    match obj.get_mut(key).and_then(Value::as_array_mut) {
        Some(items) => items.push(id_value(id)),
        None => {
            obj.insert(key.into(), Value::Array(vec![id_value(id)]));
        }
    }
}

fn display_name_of(obj: &Dictionary) -> Option<String> {
    if let Some(name) = str_attr(obj, "name") {
        return Some(name.to_owned());
    }
    str_attr(obj, "path")
        .and_then(|p| Path::new(p).file_name())
        .map(|n| n.to_string_lossy().into_owned())
}

/// Resolved path of a node given its parent's resolved path.
fn resolve(obj: &Dictionary, parent: Option<&Path>) -> Option<PathBuf> {
    let path = str_attr(obj, "path").unwrap_or("");
    let tree = str_attr(obj, "sourceTree").map_or(SourceTree::Group, SourceTree::parse);
    match tree {
        SourceTree::Group => parent.map(|p| join_segment(p, path)),
        SourceTree::SourceRoot | SourceTree::Absolute => Some(PathBuf::from(path)),
        SourceTree::Other(_) => None,
    }
}

fn join_segment(base: &Path, segment: &str) -> PathBuf {
    if segment.is_empty() {
        base.to_path_buf()
    } else {
        base.join(segment)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

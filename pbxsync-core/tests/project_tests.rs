//! Manifest load-error, atomic-save, and path-resolution integration tests.

use assert_fs::prelude::*;
use pbxsync_core::{project, types::TargetSelector, Project, ProjectError};
use predicates::prelude::predicate;
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Fixture: an XML manifest laid out the way an existing iOS project is,
// with a top-level group pointing two directories up.
// ---------------------------------------------------------------------------

const FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>archiveVersion</key>
	<string>1</string>
	<key>classes</key>
	<dict/>
	<key>objectVersion</key>
	<string>46</string>
	<key>objects</key>
	<dict>
		<key>000000000000000000000001</key>
		<dict>
			<key>isa</key>
			<string>PBXProject</string>
			<key>mainGroup</key>
			<string>000000000000000000000002</string>
			<key>projectDirPath</key>
			<string></string>
			<key>targets</key>
			<array>
				<string>000000000000000000000010</string>
				<string>000000000000000000000011</string>
			</array>
		</dict>
		<key>000000000000000000000002</key>
		<dict>
			<key>isa</key>
			<string>PBXGroup</string>
			<key>children</key>
			<array>
				<string>000000000000000000000003</string>
				<string>000000000000000000000006</string>
				<string>000000000000000000000007</string>
				<string>000000000000000000000008</string>
			</array>
			<key>sourceTree</key>
			<string>&lt;group&gt;</string>
		</dict>
		<key>000000000000000000000003</key>
		<dict>
			<key>isa</key>
			<string>PBXGroup</string>
			<key>children</key>
			<array>
				<string>000000000000000000000004</string>
			</array>
			<key>name</key>
			<string>PredatorsIOS</string>
			<key>path</key>
			<string>../..</string>
			<key>sourceTree</key>
			<string>&lt;group&gt;</string>
		</dict>
		<key>000000000000000000000004</key>
		<dict>
			<key>isa</key>
			<string>PBXGroup</string>
			<key>children</key>
			<array>
				<string>000000000000000000000005</string>
			</array>
			<key>path</key>
			<string>source_common</string>
			<key>sourceTree</key>
			<string>&lt;group&gt;</string>
		</dict>
		<key>000000000000000000000005</key>
		<dict>
			<key>isa</key>
			<string>PBXFileReference</string>
			<key>lastKnownFileType</key>
			<string>sourcecode.cpp.cpp</string>
			<key>path</key>
			<string>Game.cpp</string>
			<key>sourceTree</key>
			<string>&lt;group&gt;</string>
		</dict>
		<key>000000000000000000000006</key>
		<dict>
			<key>isa</key>
			<string>PBXFileReference</string>
			<key>path</key>
			<string>Info.plist</string>
			<key>sourceTree</key>
			<string>SOURCE_ROOT</string>
		</dict>
		<key>000000000000000000000007</key>
		<dict>
			<key>isa</key>
			<string>PBXFileReference</string>
			<key>path</key>
			<string>/opt/shared/log.h</string>
			<key>sourceTree</key>
			<string>&lt;absolute&gt;</string>
		</dict>
		<key>000000000000000000000008</key>
		<dict>
			<key>isa</key>
			<string>PBXFileReference</string>
			<key>path</key>
			<string>System/Library/Frameworks/UIKit.framework</string>
			<key>sourceTree</key>
			<string>SDKROOT</string>
		</dict>
		<key>000000000000000000000010</key>
		<dict>
			<key>isa</key>
			<string>PBXNativeTarget</string>
			<key>buildPhases</key>
			<array/>
			<key>name</key>
			<string>PredatorsIOS</string>
		</dict>
		<key>000000000000000000000011</key>
		<dict>
			<key>isa</key>
			<string>PBXNativeTarget</string>
			<key>buildPhases</key>
			<array/>
			<key>name</key>
			<string>PredatorsTests</string>
		</dict>
	</dict>
	<key>rootObject</key>
	<string>000000000000000000000001</string>
</dict>
</plist>
"#;

fn write_fixture(dir: &assert_fs::TempDir) -> PathBuf {
    let bundle = dir.child("PredatorsIOS.xcodeproj");
    bundle.child("project.pbxproj").write_str(FIXTURE).expect("write fixture");
    bundle.path().to_path_buf()
}

// ---------------------------------------------------------------------------
// 1. Load errors
// ---------------------------------------------------------------------------

#[test]
fn open_missing_bundle_returns_not_found_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let err = Project::open(dir.path().join("Nope.xcodeproj")).unwrap_err();
    assert!(matches!(err, ProjectError::NotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("project.pbxproj"));
}

#[test]
fn open_garbage_returns_parse_error() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    dir.child("App.xcodeproj/project.pbxproj")
        .write_binary(b"\x00\x01\x02 not a plist <<<")
        .expect("write");
    let err = Project::open(dir.path().join("App.xcodeproj")).unwrap_err();
    assert!(err.is_load_error(), "got: {err}");
}

#[test]
fn open_without_root_object_returns_malformed() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    dir.child("App.xcodeproj/project.pbxproj")
        .write_str(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0"><dict><key>objects</key><dict/></dict></plist>
"#,
        )
        .expect("write");
    let err = Project::open(dir.path().join("App.xcodeproj")).unwrap_err();
    assert!(matches!(err, ProjectError::Malformed { .. }), "got: {err}");
    assert!(err.to_string().contains("rootObject"));
}

// ---------------------------------------------------------------------------
// 2. Atomic save
// ---------------------------------------------------------------------------

#[test]
fn save_into_new_bundle_creates_manifest_and_no_tmp() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let project = Project::new(dir.path().join("App.xcodeproj"), "App");
    project.save().expect("save");

    dir.child("App.xcodeproj/project.pbxproj")
        .assert(predicate::path::exists());
    dir.child("App.xcodeproj/project.pbxproj.tmp")
        .assert(predicate::path::missing());
}

#[test]
fn save_preserves_unknown_attributes() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let bundle = write_fixture(&dir);
    let project = Project::open(&bundle).expect("open");
    project.save().expect("save");

    let written = fs::read_to_string(project::manifest_path(&bundle)).expect("read");
    assert!(written.contains("UIKit.framework"));
    assert!(written.contains("PredatorsTests"));
    assert!(written.contains("archiveVersion"));
}

#[test]
#[cfg(unix)]
fn save_into_readonly_bundle_is_save_error() {
    use std::os::unix::fs::PermissionsExt;

    let dir = assert_fs::TempDir::new().expect("tempdir");
    let bundle = write_fixture(&dir);
    let project = Project::open(&bundle).expect("open");

    let mut perms = fs::metadata(&bundle).unwrap().permissions();
    perms.set_mode(0o555);
    fs::set_permissions(&bundle, perms).unwrap();

    let result = project.save();

    let mut perms = fs::metadata(&bundle).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&bundle, perms).unwrap();

    // Root ignores directory permissions; only assert when the write failed.
    if let Err(err) = result {
        assert!(err.is_save_error(), "got: {err}");
        assert_eq!(
            fs::read_to_string(project::manifest_path(&bundle)).unwrap(),
            FIXTURE,
            "original manifest must be intact"
        );
    }
}

// ---------------------------------------------------------------------------
// 3. Resolution and lookup
// ---------------------------------------------------------------------------

#[rstest]
#[case::group_chain("../../source_common/Game.cpp", true)]
#[case::source_root("Info.plist", true)]
#[case::absolute("/opt/shared/log.h", true)]
#[case::sdk_anchored_never_matches("System/Library/Frameworks/UIKit.framework", false)]
#[case::parent_segments_are_not_collapsed("../../source_common/../source_common/Game.cpp", false)]
fn find_by_full_path(#[case] full: &str, #[case] found: bool) {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let project = Project::open(write_fixture(&dir)).expect("open");
    let hit = project.find_file_by_full_path(Path::new(full)).expect("lookup");
    assert_eq!(hit.is_some(), found, "lookup of {full}");
}

#[test]
fn named_group_is_found_by_name_not_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let project = Project::open(write_fixture(&dir)).expect("open");
    let main = project.main_group().clone();
    let group = project.child_group(&main, "PredatorsIOS").expect("lookup");
    assert!(group.is_some());
    assert!(project.child_group(&main, "..").expect("lookup").is_none());
}

#[test]
fn file_reference_reports_group_chain() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let project = Project::open(write_fixture(&dir)).expect("open");
    let game = project
        .file_references()
        .expect("refs")
        .into_iter()
        .find(|f| f.path == "Game.cpp")
        .expect("Game.cpp");
    assert_eq!(game.group_names, vec!["PredatorsIOS", "source_common"]);
}

#[rstest]
#[case::first(TargetSelector::First, "PredatorsIOS")]
#[case::named(TargetSelector::Named("PredatorsTests".into()), "PredatorsTests")]
fn select_target(#[case] selector: TargetSelector, #[case] expected: &str) {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let project = Project::open(write_fixture(&dir)).expect("open");
    assert_eq!(project.select_target(&selector).expect("target").name, expected);
}

#[test]
fn adding_to_target_without_phases_creates_sources_phase_that_survives_save() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let bundle = write_fixture(&dir);
    let mut project = Project::open(&bundle).expect("open");
    let target = project.select_target(&TargetSelector::First).expect("target");
    assert!(project.sources_phase(&target.id).expect("phase").is_none());

    let main = project.main_group().clone();
    let file = project.new_file(&main, "AppDelegate.mm").expect("new_file");
    project.add_to_compile_sources(&target.id, &file).expect("add");
    project.save().expect("save");

    let reloaded = Project::open(&bundle).expect("reopen");
    assert_eq!(reloaded.compile_sources(&target.id).expect("sources"), vec![file]);
}

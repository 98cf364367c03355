//! Integration tests for the watcher public API.

use grade_guardian::watcher::DocumentWatcher;
use std::path::Path;

fn extensions() -> Vec<String> {
    ["py", "js", "java"].iter().map(|e| e.to_string()).collect()
}

#[test]
fn watcher_accepts_configured_extensions() {
    let exts = extensions();
    assert!(DocumentWatcher::is_source_file(Path::new("hw1.py"), &exts));
    assert!(DocumentWatcher::is_source_file(Path::new("src/app.js"), &exts));
    assert!(DocumentWatcher::is_source_file(Path::new("Main.java"), &exts));
}

#[test]
fn watcher_rejects_other_files() {
    let exts = extensions();
    assert!(!DocumentWatcher::is_source_file(Path::new("notes.txt"), &exts));
    assert!(!DocumentWatcher::is_source_file(Path::new("hw1.pyc"), &exts));
    assert!(!DocumentWatcher::is_source_file(Path::new(".gradeguardianrc.json"), &exts));
}

#[test]
fn watcher_rejects_vendored_directories() {
    let exts = extensions();
    assert!(!DocumentWatcher::is_source_file(
        Path::new("node_modules/lib/index.js"),
        &exts
    ));
    assert!(!DocumentWatcher::is_source_file(
        Path::new("rust/target/debug/build.py"),
        &exts
    ));
}

#[test]
fn watcher_watch_temp_dir_succeeds() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = DocumentWatcher::watch(dir.path(), &["py"]);
    assert!(
        result.is_ok(),
        "watch on temp dir should succeed: {:?}",
        result.err()
    );
}

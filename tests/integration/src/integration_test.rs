//! End-to-end reconciliation against a real directory
//!
//! Each test opens a handle, prepares, then performs the filesystem mutation
//! the way a caller would.

use checkout_core::{Error, FileHandle, Outcome, PendingChangeKind, Warning};
use checkout_fs::LocalFilesystem;
use checkout_test_utils::TestWorkspace;
use pretty_assertions::assert_eq;
use std::fs;

#[test]
fn test_edit_existing_file_then_write() {
    let ws = TestWorkspace::new();
    let gateway = ws.gateway();
    let path = ws.write_file("src/lib.rs", "pub fn a() {}\n");
    gateway.add_server_file(path.clone(), "pub fn a() {}\n");

    let handle = FileHandle::open(&gateway, LocalFilesystem::new(), path.clone()).unwrap();
    let report = handle.prepare_for_edit().unwrap();
    fs::write(path.to_native(), "pub fn b() {}\n").unwrap();

    assert_eq!(report.outcome, Outcome::Pended(PendingChangeKind::Edit));
    assert_eq!(gateway.pending_for(path), vec![PendingChangeKind::Edit]);
    assert_eq!(ws.read_file("src/lib.rs"), "pub fn b() {}\n");
}

#[test]
fn test_edit_fetches_server_copy_when_missing_locally() {
    let ws = TestWorkspace::new();
    let gateway = ws.gateway();
    let path = ws.path("docs/readme.md");
    gateway.add_server_file(path.clone(), "# Server copy\n");

    let handle = FileHandle::open(&gateway, LocalFilesystem::new(), path).unwrap();
    handle.prepare_for_edit().unwrap();

    assert!(ws.file_exists("docs/readme.md"));
    assert_eq!(ws.read_file("docs/readme.md"), "# Server copy\n");
}

#[test]
fn test_add_new_file() {
    let ws = TestWorkspace::new();
    let gateway = ws.gateway();
    let path = ws.write_file("new.txt", "fresh");

    let handle = FileHandle::open(&gateway, LocalFilesystem::new(), path.clone()).unwrap();
    handle.add_file().unwrap();

    assert_eq!(gateway.pending_for(path), vec![PendingChangeKind::Add]);
}

#[test]
fn test_add_before_file_is_written_fails() {
    let ws = TestWorkspace::new();
    let gateway = ws.gateway();

    let handle = FileHandle::open(&gateway, LocalFilesystem::new(), ws.path("later.txt")).unwrap();

    assert!(matches!(handle.add_file(), Err(Error::MissingLocalFile { .. })));
}

#[test]
fn test_delete_then_remove_from_disk() {
    let ws = TestWorkspace::new();
    let gateway = ws.gateway();
    let path = ws.write_file("old.txt", "bye");
    gateway.add_server_file(path.clone(), "bye");

    let handle = FileHandle::open(&gateway, LocalFilesystem::new(), path.clone()).unwrap();
    let report = handle.prepare_for_delete().unwrap();
    ws.remove_file("old.txt");

    assert!(report.warnings.is_empty());
    assert_eq!(gateway.pending_for(path), vec![PendingChangeKind::Delete]);
    assert!(!ws.file_exists("old.txt"));
}

#[test]
fn test_delete_catches_up_with_out_of_band_removal() {
    let ws = TestWorkspace::new();
    let gateway = ws.gateway();
    let path = ws.path("gone.txt");
    gateway.add_server_file(path.clone(), "content");

    let handle = FileHandle::open(&gateway, LocalFilesystem::new(), path.clone()).unwrap();
    let report = handle.prepare_for_delete().unwrap();

    assert_eq!(report.warnings, vec![Warning::MissingLocally]);
    assert_eq!(gateway.pending_for(path), vec![PendingChangeKind::Delete]);
}

#[test]
fn test_path_outside_workspace_is_rejected() {
    let ws = TestWorkspace::new();
    let gateway = ws.gateway();
    let outside = tempfile::TempDir::new().unwrap();

    let result = FileHandle::open(&gateway, LocalFilesystem::new(), outside.path().join("x.txt"));

    assert!(matches!(result, Err(Error::NoWorkspace { .. })));
    assert!(gateway.calls().is_empty());
}

//! Multi-step workflows: one fresh handle per operation, shared server state

use checkout_core::{CheckoutConfig, FileHandle, GatewayOperation, Outcome, PendingChangeKind};
use checkout_fs::{LocalFilesystem, NormalizedPath};
use checkout_test_utils::{FakeGateway, TestWorkspace};
use pretty_assertions::assert_eq;

fn open<'a>(
    gateway: &'a FakeGateway,
    path: &NormalizedPath,
) -> FileHandle<&'a FakeGateway, LocalFilesystem> {
    FileHandle::open(gateway, LocalFilesystem::new(), path.clone()).unwrap()
}

#[test]
fn test_delete_then_change_mind_and_edit() {
    let ws = TestWorkspace::new();
    let gateway = ws.gateway();
    let path = ws.write_file("src/main.rs", "fn main() {}\n");
    gateway.add_server_file(path.clone(), "fn main() {}\n");

    open(&gateway, &path).prepare_for_delete().unwrap();
    ws.remove_file("src/main.rs");

    // Undoing the delete restores the file, so no separate download
    let report = open(&gateway, &path).prepare_for_edit().unwrap();

    assert_eq!(report.outcome, Outcome::Pended(PendingChangeKind::Edit));
    assert_eq!(ws.read_file("src/main.rs"), "fn main() {}\n");
    assert_eq!(gateway.count(GatewayOperation::DownloadLatest), 0);
    assert_eq!(gateway.pending_for(path), vec![PendingChangeKind::Edit]);
}

#[test]
fn test_edit_then_delete_keeps_local_changes_for_caller() {
    let ws = TestWorkspace::new();
    let gateway = ws.gateway();
    let path = ws.write_file("notes.txt", "v1");
    gateway.add_server_file(path.clone(), "v1");

    open(&gateway, &path).prepare_for_edit().unwrap();
    std::fs::write(path.to_native(), "v2 local").unwrap();
    open(&gateway, &path).prepare_for_delete().unwrap();

    // File present, so the undo did not overwrite it
    assert_eq!(ws.read_file("notes.txt"), "v2 local");
    assert_eq!(gateway.pending_for(path), vec![PendingChangeKind::Delete]);
}

#[test]
fn test_repeated_saves_pend_edit_once() {
    let ws = TestWorkspace::new();
    let gateway = ws.gateway();
    let path = ws.write_file("a.txt", "x");
    gateway.add_server_file(path.clone(), "x");

    for _ in 0..3 {
        open(&gateway, &path).prepare_for_edit().unwrap();
    }

    assert_eq!(gateway.count(GatewayOperation::PendEdit), 1);
}

#[test]
fn test_logging_from_workspace_config() {
    let ws = TestWorkspace::new();
    ws.write_file(".checkout.toml", "log_filter = \"checkout_core=debug\"\n");
    let config = CheckoutConfig::load_or_default(&ws.path(".checkout.toml")).unwrap();
    assert_eq!(config.log_filter, "checkout_core=debug");

    // Only one global subscriber per process
    let _ = checkout_core::logging::init_from_config(&config);
    tracing::info!("workflow test logging enabled");

    let gateway = ws.gateway();
    let path = ws.write_file("b.txt", "y");

    open(&gateway, &path).add_file().unwrap();

    assert_eq!(gateway.pending_for(path), vec![PendingChangeKind::Add]);
}

//! [`TestWorkspace`] fixture: a temp directory mapped as a workspace.

use std::fs;

use checkout_core::WorkspaceRef;
use checkout_fs::NormalizedPath;
use tempfile::TempDir;

use crate::FakeGateway;

/// A temporary directory standing in for a mapped local workspace.
///
/// # Example
///
/// ```rust,no_run
/// use checkout_test_utils::TestWorkspace;
///
/// let ws = TestWorkspace::new();
/// let gateway = ws.gateway();
/// ws.write_file("src/lib.rs", "fn main() {}");
/// gateway.add_server_file(ws.path("src/lib.rs"), "fn main() {}");
/// ```
pub struct TestWorkspace {
    // Removed on drop
    _temp_dir: TempDir,
    root: NormalizedPath,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("TestWorkspace::new: failed to create temp dir");
        let root = NormalizedPath::new(temp_dir.path());
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Absolute path of `relative` inside the workspace.
    pub fn path(&self, relative: &str) -> NormalizedPath {
        self.root.join(relative)
    }

    pub fn workspace_ref(&self) -> WorkspaceRef {
        WorkspaceRef::new("test-workspace", "tester", self.root.clone())
    }

    /// A [`FakeGateway`] with this workspace mapped, writing to the real disk.
    pub fn gateway(&self) -> FakeGateway {
        FakeGateway::new().with_workspace(self.workspace_ref())
    }

    /// Write a file, creating parent directories.
    ///
    /// # Panics
    /// Panics if the filesystem operations fail.
    pub fn write_file(&self, relative: &str, content: &str) -> NormalizedPath {
        let path = self.path(relative);
        let native = path.to_native();
        if let Some(parent) = native.parent() {
            fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("write_file: failed to create {}: {e}", parent.display())
            });
        }
        fs::write(&native, content)
            .unwrap_or_else(|e| panic!("write_file: failed to write {}: {e}", native.display()));
        path
    }

    pub fn remove_file(&self, relative: &str) {
        let native = self.path(relative).to_native();
        fs::remove_file(&native)
            .unwrap_or_else(|e| panic!("remove_file: failed to remove {}: {e}", native.display()));
    }

    pub fn read_file(&self, relative: &str) -> String {
        let native = self.path(relative).to_native();
        fs::read_to_string(&native)
            .unwrap_or_else(|e| panic!("read_file: failed to read {}: {e}", native.display()))
    }

    pub fn file_exists(&self, relative: &str) -> bool {
        self.path(relative).is_file()
    }
}

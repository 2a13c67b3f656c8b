//! In-memory version-control server for reconciler tests.
//!
//! [`FakeGateway`] keeps server items, per-path pending changes, and a
//! record of every call it receives. Failures, non-success pend codes, and
//! non-fatal events can be scheduled per operation.
//!
//! # Example
//!
//! ```rust,no_run
//! use checkout_core::{FileHandle, PendingChangeKind, WorkspaceRef};
//! use checkout_fs::MemoryFilesystem;
//! use checkout_test_utils::FakeGateway;
//!
//! let fs = MemoryFilesystem::with_files(["/ws/a.txt"]);
//! let gateway = FakeGateway::new()
//!     .with_workspace(WorkspaceRef::new("dev", "tester", "/ws"))
//!     .with_memory_filesystem(fs.clone());
//! gateway.add_server_file("/ws/a.txt", "content");
//!
//! let handle = FileHandle::open(&gateway, fs, "/ws/a.txt").unwrap();
//! handle.prepare_for_edit().unwrap();
//! assert_eq!(gateway.pending_for("/ws/a.txt"), vec![PendingChangeKind::Edit]);
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::sync::{Arc, Mutex, MutexGuard};

use checkout_core::{
    DeletedState, GatewayError, GatewayOperation, GatewayResult, ItemKind, NonFatalError,
    NonFatalHandler, PendResult, PendingChangeKind, RecursionType, VersionControlGateway,
    WorkspaceRef,
};
use checkout_fs::{Filesystem, LocalFilesystem, MemoryFilesystem, NormalizedPath};

/// Where the fake server "writes to disk".
#[derive(Debug, Clone)]
pub enum LocalMirror {
    /// The real filesystem.
    Disk,
    /// A shared in-memory filesystem.
    Memory(MemoryFilesystem),
}

impl LocalMirror {
    fn exists(&self, path: &NormalizedPath) -> bool {
        match self {
            Self::Disk => LocalFilesystem::new().exists(path),
            Self::Memory(fs) => fs.exists(path),
        }
    }

    fn write(&self, path: &NormalizedPath, content: &str) -> GatewayResult<()> {
        match self {
            Self::Disk => {
                let native = path.to_native();
                if let Some(parent) = native.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(native, content)?;
            }
            Self::Memory(fs) => {
                fs.insert(path.clone());
            }
        }
        Ok(())
    }
}

/// A call received by [`FakeGateway`], with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    ItemExists {
        path: NormalizedPath,
        kind: ItemKind,
        deleted: DeletedState,
    },
    PendingChanges {
        path: NormalizedPath,
        recursion: RecursionType,
        detailed: bool,
    },
    UndoPendingChange {
        path: NormalizedPath,
        write_to_disk: bool,
    },
    DownloadLatest {
        path: NormalizedPath,
    },
    GetLatest {
        path: NormalizedPath,
        recursion: RecursionType,
        overwrite: bool,
    },
    PendEdit {
        path: NormalizedPath,
    },
    PendAdd {
        path: NormalizedPath,
    },
    PendDelete {
        path: NormalizedPath,
    },
}

impl GatewayCall {
    pub fn operation(&self) -> GatewayOperation {
        match self {
            Self::ItemExists { .. } => GatewayOperation::ItemExists,
            Self::PendingChanges { .. } => GatewayOperation::PendingChanges,
            Self::UndoPendingChange { .. } => GatewayOperation::UndoPendingChange,
            Self::DownloadLatest { .. } => GatewayOperation::DownloadLatest,
            Self::GetLatest { .. } => GatewayOperation::GetLatest,
            Self::PendEdit { .. } => GatewayOperation::PendEdit,
            Self::PendAdd { .. } => GatewayOperation::PendAdd,
            Self::PendDelete { .. } => GatewayOperation::PendDelete,
        }
    }

    /// Whether the call changes server or local state.
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Self::ItemExists { .. } | Self::PendingChanges { .. }
        )
    }
}

#[derive(Debug, Clone)]
struct ServerItem {
    content: String,
    folder: bool,
    deleted: bool,
}

#[derive(Debug)]
struct FakeServer {
    workspaces: Vec<WorkspaceRef>,
    items: HashMap<NormalizedPath, ServerItem>,
    pending: HashMap<NormalizedPath, Vec<PendingChangeKind>>,
    downloaded: HashSet<NormalizedPath>,
    local: LocalMirror,
    calls: Vec<GatewayCall>,
    resolve_count: usize,
    failures: HashMap<GatewayOperation, String>,
    pend_codes: HashMap<GatewayOperation, i32>,
    non_fatal: HashMap<GatewayOperation, Vec<String>>,
}

/// Fake version-control server.
///
/// Clones share state, so a test can hand one clone to a
/// [`checkout_core::FileHandle`] and inspect another.
#[derive(Debug, Clone)]
pub struct FakeGateway {
    inner: Arc<Mutex<FakeServer>>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGateway {
    /// A server with no workspaces and no items, writing to the real disk.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeServer {
                workspaces: Vec::new(),
                items: HashMap::new(),
                pending: HashMap::new(),
                downloaded: HashSet::new(),
                local: LocalMirror::Disk,
                calls: Vec::new(),
                resolve_count: 0,
                failures: HashMap::new(),
                pend_codes: HashMap::new(),
                non_fatal: HashMap::new(),
            })),
        }
    }

    pub fn with_workspace(self, workspace: WorkspaceRef) -> Self {
        self.state().workspaces.push(workspace);
        self
    }

    /// Write restored and fetched files into `fs` instead of the disk.
    pub fn with_memory_filesystem(self, fs: MemoryFilesystem) -> Self {
        self.state().local = LocalMirror::Memory(fs);
        self
    }

    pub fn add_server_file(&self, path: impl Into<NormalizedPath>, content: &str) {
        self.insert_item(path.into(), content, false, false);
    }

    pub fn add_server_folder(&self, path: impl Into<NormalizedPath>) {
        self.insert_item(path.into(), "", true, false);
    }

    /// An item that exists on the server only in deleted state.
    pub fn add_deleted_server_file(&self, path: impl Into<NormalizedPath>, content: &str) {
        self.insert_item(path.into(), content, false, true);
    }

    pub fn add_pending(&self, path: impl Into<NormalizedPath>, kind: PendingChangeKind) {
        self.state().pending.entry(path.into()).or_default().push(kind);
    }

    pub fn pending_for(&self, path: impl Into<NormalizedPath>) -> Vec<PendingChangeKind> {
        self.state()
            .pending
            .get(&path.into())
            .cloned()
            .unwrap_or_default()
    }

    pub fn was_downloaded(&self, path: impl Into<NormalizedPath>) -> bool {
        self.state().downloaded.contains(&path.into())
    }

    /// Every server call so far, in order. Workspace resolution is local and
    /// is not recorded here; see [`FakeGateway::resolve_count`].
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state().calls.clone()
    }

    pub fn operations(&self) -> Vec<GatewayOperation> {
        self.state().calls.iter().map(GatewayCall::operation).collect()
    }

    pub fn count(&self, operation: GatewayOperation) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    pub fn mutating_calls(&self) -> Vec<GatewayCall> {
        self.state()
            .calls
            .iter()
            .filter(|call| call.is_mutating())
            .cloned()
            .collect()
    }

    pub fn resolve_count(&self) -> usize {
        self.state().resolve_count
    }

    /// Make every later call of `operation` fail with a connection error.
    pub fn fail_on(&self, operation: GatewayOperation) {
        self.fail_on_with(operation, &format!("injected {operation} failure"));
    }

    pub fn fail_on_with(&self, operation: GatewayOperation, message: &str) {
        self.state().failures.insert(operation, message.to_string());
    }

    /// Answer later pend requests of `operation` with `code` and leave
    /// pending state untouched.
    pub fn set_pend_result(&self, operation: GatewayOperation, code: i32) {
        self.state().pend_codes.insert(operation, code);
    }

    /// Raise a non-fatal event during every later call of `operation`.
    pub fn emit_non_fatal(&self, operation: GatewayOperation, message: &str) {
        self.state()
            .non_fatal
            .entry(operation)
            .or_default()
            .push(message.to_string());
    }

    fn insert_item(&self, path: NormalizedPath, content: &str, folder: bool, deleted: bool) {
        self.state().items.insert(
            path,
            ServerItem {
                content: content.to_string(),
                folder,
                deleted,
            },
        );
    }

    fn state(&self) -> MutexGuard<'_, FakeServer> {
        self.inner.lock().expect("FakeGateway state poisoned")
    }

    /// Record the call, deliver scheduled events, and apply injected failure.
    fn begin(
        &self,
        call: GatewayCall,
        path: &NormalizedPath,
        events: &dyn NonFatalHandler,
    ) -> GatewayResult<MutexGuard<'_, FakeServer>> {
        let operation = call.operation();
        let mut state = self.state();
        state.calls.push(call);

        let messages = state.non_fatal.get(&operation).cloned().unwrap_or_default();
        for message in messages {
            events.on_non_fatal(NonFatalError::for_path(path.clone(), message));
        }

        if let Some(message) = state.failures.get(&operation) {
            return Err(GatewayError::Connection {
                message: message.clone(),
            });
        }
        Ok(state)
    }
}

impl FakeServer {
    fn matches(
        &self,
        base: &NormalizedPath,
        candidate: &NormalizedPath,
        recursion: RecursionType,
    ) -> bool {
        match recursion {
            RecursionType::None => candidate == base,
            RecursionType::OneLevel => {
                candidate == base || candidate.parent().as_ref() == Some(base)
            }
            RecursionType::Full => candidate.starts_with(base),
        }
    }

    fn live_item(&self, path: &NormalizedPath) -> Option<&ServerItem> {
        self.items.get(path).filter(|item| !item.deleted)
    }
}

impl VersionControlGateway for FakeGateway {
    fn resolve_workspace(&self, path: &NormalizedPath) -> Option<WorkspaceRef> {
        let mut state = self.state();
        state.resolve_count += 1;
        state.workspaces.iter().find(|ws| ws.maps(path)).cloned()
    }

    fn item_exists(
        &self,
        path: &NormalizedPath,
        kind: ItemKind,
        deleted: DeletedState,
        events: &dyn NonFatalHandler,
    ) -> GatewayResult<bool> {
        let call = GatewayCall::ItemExists {
            path: path.clone(),
            kind,
            deleted,
        };
        let state = self.begin(call, path, events)?;

        Ok(state.items.get(path).is_some_and(|item| {
            let kind_ok = match kind {
                ItemKind::Any => true,
                ItemKind::File => !item.folder,
                ItemKind::Folder => item.folder,
            };
            let deleted_ok = match deleted {
                DeletedState::Any => true,
                DeletedState::NonDeleted => !item.deleted,
                DeletedState::Deleted => item.deleted,
            };
            kind_ok && deleted_ok
        }))
    }

    fn pending_changes(
        &self,
        _workspace: &WorkspaceRef,
        path: &NormalizedPath,
        recursion: RecursionType,
        detailed: bool,
        events: &dyn NonFatalHandler,
    ) -> GatewayResult<Vec<PendingChangeKind>> {
        let call = GatewayCall::PendingChanges {
            path: path.clone(),
            recursion,
            detailed,
        };
        let state = self.begin(call, path, events)?;

        let mut matched: Vec<(&NormalizedPath, &Vec<PendingChangeKind>)> = state
            .pending
            .iter()
            .filter(|(candidate, _)| state.matches(path, candidate, recursion))
            .collect();
        matched.sort_by(|a, b| a.0.cmp(b.0));

        Ok(matched
            .into_iter()
            .flat_map(|(_, kinds)| kinds.iter().copied())
            .collect())
    }

    fn undo_pending_change(
        &self,
        _workspace: &WorkspaceRef,
        path: &NormalizedPath,
        write_to_disk: bool,
        events: &dyn NonFatalHandler,
    ) -> GatewayResult<()> {
        let call = GatewayCall::UndoPendingChange {
            path: path.clone(),
            write_to_disk,
        };
        let mut state = self.begin(call, path, events)?;

        let Some(undone) = state.pending.remove(path) else {
            return Err(GatewayError::Rejected {
                message: format!("no pending change for {path}"),
            });
        };

        let restores_content = undone
            .iter()
            .any(|kind| matches!(kind, PendingChangeKind::Edit | PendingChangeKind::Delete));
        if write_to_disk && restores_content {
            if let Some(item) = state.items.get(path) {
                state.local.write(path, &item.content)?;
            }
        }
        Ok(())
    }

    fn download_latest(
        &self,
        path: &NormalizedPath,
        events: &dyn NonFatalHandler,
    ) -> GatewayResult<()> {
        let call = GatewayCall::DownloadLatest { path: path.clone() };
        let mut state = self.begin(call, path, events)?;

        if state.live_item(path).is_none() {
            return Err(GatewayError::Rejected {
                message: format!("{path} has no downloadable version"),
            });
        }
        state.downloaded.insert(path.clone());
        Ok(())
    }

    fn get_latest(
        &self,
        _workspace: &WorkspaceRef,
        path: &NormalizedPath,
        recursion: RecursionType,
        overwrite: bool,
        events: &dyn NonFatalHandler,
    ) -> GatewayResult<()> {
        let call = GatewayCall::GetLatest {
            path: path.clone(),
            recursion,
            overwrite,
        };
        let state = self.begin(call, path, events)?;

        let Some(item) = state.live_item(path) else {
            return Ok(());
        };
        if item.folder || (!overwrite && state.local.exists(path)) {
            return Ok(());
        }
        state.local.write(path, &item.content)
    }

    fn pend_edit(
        &self,
        _workspace: &WorkspaceRef,
        path: &NormalizedPath,
        events: &dyn NonFatalHandler,
    ) -> GatewayResult<PendResult> {
        let call = GatewayCall::PendEdit { path: path.clone() };
        let mut state = self.begin(call, path, events)?;

        if let Some(code) = state.pend_codes.get(&GatewayOperation::PendEdit) {
            return Ok(PendResult(*code));
        }
        if state.live_item(path).is_none() || !state.local.exists(path) {
            return Ok(PendResult(0));
        }
        state.pending.entry(path.clone()).or_default().push(PendingChangeKind::Edit);
        Ok(PendResult::SUCCESS)
    }

    fn pend_add(
        &self,
        _workspace: &WorkspaceRef,
        path: &NormalizedPath,
        events: &dyn NonFatalHandler,
    ) -> GatewayResult<PendResult> {
        let call = GatewayCall::PendAdd { path: path.clone() };
        let mut state = self.begin(call, path, events)?;

        if let Some(code) = state.pend_codes.get(&GatewayOperation::PendAdd) {
            return Ok(PendResult(*code));
        }
        if state.live_item(path).is_some() || !state.local.exists(path) {
            return Ok(PendResult(0));
        }
        state.pending.entry(path.clone()).or_default().push(PendingChangeKind::Add);
        Ok(PendResult::SUCCESS)
    }

    fn pend_delete(
        &self,
        _workspace: &WorkspaceRef,
        path: &NormalizedPath,
        events: &dyn NonFatalHandler,
    ) -> GatewayResult<PendResult> {
        let call = GatewayCall::PendDelete { path: path.clone() };
        let mut state = self.begin(call, path, events)?;

        if let Some(code) = state.pend_codes.get(&GatewayOperation::PendDelete) {
            return Ok(PendResult(*code));
        }
        if !state.items.contains_key(path) {
            return Ok(PendResult(0));
        }
        state.pending.entry(path.clone()).or_default().push(PendingChangeKind::Delete);
        Ok(PendResult::SUCCESS)
    }
}

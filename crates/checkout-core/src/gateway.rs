//! Version-control gateway trait
//!
//! The server connection is injected into every [`crate::FileHandle`]. All
//! calls are blocking round-trips; each one receives the handler that the
//! server's non-fatal events are delivered to.

use std::rc::Rc;
use std::sync::Arc;

use checkout_fs::NormalizedPath;

use crate::events::NonFatalHandler;
use crate::pending::{PendResult, PendingChangeKind};

/// Result type for gateway calls
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Failures a gateway can report.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Connection to server failed: {message}")]
    Connection { message: String },

    #[error("Server rejected the request: {message}")]
    Rejected { message: String },

    #[error("Local I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A resolved workspace: the local/server mapping that scopes pending changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkspaceRef {
    pub name: String,
    pub owner: String,
    /// Local directory the workspace maps.
    pub local_root: NormalizedPath,
}

impl WorkspaceRef {
    pub fn new(
        name: impl Into<String>,
        owner: impl Into<String>,
        local_root: impl Into<NormalizedPath>,
    ) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            local_root: local_root.into(),
        }
    }

    /// Whether `path` lies inside this workspace's local root.
    pub fn maps(&self, path: &NormalizedPath) -> bool {
        path.starts_with(&self.local_root)
    }
}

impl std::fmt::Display for WorkspaceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{};{}", self.name, self.owner)
    }
}

/// Item type filter for existence queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Any,
    File,
    Folder,
}

/// Whether existence queries consider deleted items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletedState {
    NonDeleted,
    Deleted,
    Any,
}

/// How far below a path a query or get reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionType {
    None,
    OneLevel,
    Full,
}

/// Names a gateway call, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOperation {
    ItemExists,
    PendingChanges,
    UndoPendingChange,
    DownloadLatest,
    GetLatest,
    PendEdit,
    PendAdd,
    PendDelete,
}

impl GatewayOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ItemExists => "item-exists",
            Self::PendingChanges => "pending-changes",
            Self::UndoPendingChange => "undo",
            Self::DownloadLatest => "download",
            Self::GetLatest => "get-latest",
            Self::PendEdit => "pend-edit",
            Self::PendAdd => "pend-add",
            Self::PendDelete => "pend-delete",
        }
    }
}

impl std::fmt::Display for GatewayOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection to a centralized version-control server.
///
/// Implementations own authentication, transport, and workspace discovery.
pub trait VersionControlGateway {
    /// Find the workspace mapping `path`, if any. Answered from local
    /// workspace information; never contacts the server.
    fn resolve_workspace(&self, path: &NormalizedPath) -> Option<WorkspaceRef>;

    /// Whether the server has an item at `path`.
    fn item_exists(
        &self,
        path: &NormalizedPath,
        kind: ItemKind,
        deleted: DeletedState,
        events: &dyn NonFatalHandler,
    ) -> GatewayResult<bool>;

    /// Kinds of the changes pending against `path` in `workspace`.
    fn pending_changes(
        &self,
        workspace: &WorkspaceRef,
        path: &NormalizedPath,
        recursion: RecursionType,
        detailed: bool,
        events: &dyn NonFatalHandler,
    ) -> GatewayResult<Vec<PendingChangeKind>>;

    /// Undo the change pending against `path`. With `write_to_disk` the
    /// server also puts the pre-change content back on the local disk.
    fn undo_pending_change(
        &self,
        workspace: &WorkspaceRef,
        path: &NormalizedPath,
        write_to_disk: bool,
        events: &dyn NonFatalHandler,
    ) -> GatewayResult<()>;

    /// Download the latest server version of `path`.
    fn download_latest(
        &self,
        path: &NormalizedPath,
        events: &dyn NonFatalHandler,
    ) -> GatewayResult<()>;

    /// Bring the workspace copy of `path` to the latest version.
    fn get_latest(
        &self,
        workspace: &WorkspaceRef,
        path: &NormalizedPath,
        recursion: RecursionType,
        overwrite: bool,
        events: &dyn NonFatalHandler,
    ) -> GatewayResult<()>;

    fn pend_edit(
        &self,
        workspace: &WorkspaceRef,
        path: &NormalizedPath,
        events: &dyn NonFatalHandler,
    ) -> GatewayResult<PendResult>;

    fn pend_add(
        &self,
        workspace: &WorkspaceRef,
        path: &NormalizedPath,
        events: &dyn NonFatalHandler,
    ) -> GatewayResult<PendResult>;

    fn pend_delete(
        &self,
        workspace: &WorkspaceRef,
        path: &NormalizedPath,
        events: &dyn NonFatalHandler,
    ) -> GatewayResult<PendResult>;
}

macro_rules! forward_gateway {
    ($($ty:ty),+) => {$(
        impl<G: VersionControlGateway + ?Sized> VersionControlGateway for $ty {
            fn resolve_workspace(&self, path: &NormalizedPath) -> Option<WorkspaceRef> {
                (**self).resolve_workspace(path)
            }

            fn item_exists(
                &self,
                path: &NormalizedPath,
                kind: ItemKind,
                deleted: DeletedState,
                events: &dyn NonFatalHandler,
            ) -> GatewayResult<bool> {
                (**self).item_exists(path, kind, deleted, events)
            }

            fn pending_changes(
                &self,
                workspace: &WorkspaceRef,
                path: &NormalizedPath,
                recursion: RecursionType,
                detailed: bool,
                events: &dyn NonFatalHandler,
            ) -> GatewayResult<Vec<PendingChangeKind>> {
                (**self).pending_changes(workspace, path, recursion, detailed, events)
            }

            fn undo_pending_change(
                &self,
                workspace: &WorkspaceRef,
                path: &NormalizedPath,
                write_to_disk: bool,
                events: &dyn NonFatalHandler,
            ) -> GatewayResult<()> {
                (**self).undo_pending_change(workspace, path, write_to_disk, events)
            }

            fn download_latest(
                &self,
                path: &NormalizedPath,
                events: &dyn NonFatalHandler,
            ) -> GatewayResult<()> {
                (**self).download_latest(path, events)
            }

            fn get_latest(
                &self,
                workspace: &WorkspaceRef,
                path: &NormalizedPath,
                recursion: RecursionType,
                overwrite: bool,
                events: &dyn NonFatalHandler,
            ) -> GatewayResult<()> {
                (**self).get_latest(workspace, path, recursion, overwrite, events)
            }

            fn pend_edit(
                &self,
                workspace: &WorkspaceRef,
                path: &NormalizedPath,
                events: &dyn NonFatalHandler,
            ) -> GatewayResult<PendResult> {
                (**self).pend_edit(workspace, path, events)
            }

            fn pend_add(
                &self,
                workspace: &WorkspaceRef,
                path: &NormalizedPath,
                events: &dyn NonFatalHandler,
            ) -> GatewayResult<PendResult> {
                (**self).pend_add(workspace, path, events)
            }

            fn pend_delete(
                &self,
                workspace: &WorkspaceRef,
                path: &NormalizedPath,
                events: &dyn NonFatalHandler,
            ) -> GatewayResult<PendResult> {
                (**self).pend_delete(workspace, path, events)
            }
        }
    )+};
}

forward_gateway!(&G, Box<G>, Rc<G>, Arc<G>);

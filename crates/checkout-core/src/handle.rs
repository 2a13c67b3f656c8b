//! Per-file reconciliation against the server's pending-change table

use checkout_fs::{Filesystem, NormalizedPath};
use tracing::{debug, error, warn};

use crate::events::{NonFatalError, NonFatalLog};
use crate::gateway::{
    DeletedState, GatewayError, GatewayOperation, ItemKind, RecursionType, VersionControlGateway,
    WorkspaceRef,
};
use crate::pending::PendingChangeKind;
use crate::report::{Outcome, Report, Warning};
use crate::{Error, Result};

/// One local file, bound to its workspace and a server connection.
///
/// Build a handle right before mutating the file and drop it afterwards.
/// Whether the server has the file is queried once, at construction; open a
/// new handle to observe server-side changes made elsewhere. Local existence
/// is always checked live.
///
/// Not safe to use from several places at once against the same path; the
/// caller serialises reconciliations per path.
pub struct FileHandle<G, F> {
    gateway: G,
    filesystem: F,
    path: NormalizedPath,
    workspace: WorkspaceRef,
    exists_on_server: bool,
    events: NonFatalLog,
}

impl<G, F> FileHandle<G, F>
where
    G: VersionControlGateway,
    F: Filesystem,
{
    /// Resolve the workspace for `path` and snapshot server existence.
    ///
    /// # Errors
    ///
    /// - [`Error::NoWorkspace`] if no workspace maps the path. No server
    ///   call is made in that case.
    /// - [`Error::ServerCommunication`] if the existence query fails.
    pub fn open(gateway: G, filesystem: F, path: impl Into<NormalizedPath>) -> Result<Self> {
        let path = path.into();

        let Some(workspace) = gateway.resolve_workspace(&path) else {
            error!(path = %path, "No workspace maps this path");
            return Err(Error::NoWorkspace {
                path: path.to_native(),
            });
        };

        let events = NonFatalLog::new();
        let exists_on_server = gateway
            .item_exists(&path, ItemKind::Any, DeletedState::Any, &events)
            .map_err(|e| log_server_error(&path, GatewayOperation::ItemExists, e))?;

        debug!(path = %path, workspace = %workspace, exists_on_server, "Opened file handle");

        Ok(Self {
            gateway,
            filesystem,
            path,
            workspace,
            exists_on_server,
            events,
        })
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    pub fn workspace(&self) -> &WorkspaceRef {
        &self.workspace
    }

    /// Server existence as of construction.
    pub fn exists_on_server(&self) -> bool {
        self.exists_on_server
    }

    /// Local existence, checked now.
    pub fn exists_on_filesystem(&self) -> bool {
        self.filesystem.exists(&self.path)
    }

    /// Non-fatal server errors reported during this handle's calls.
    pub fn non_fatal_errors(&self) -> Vec<NonFatalError> {
        self.events.snapshot()
    }

    /// Kinds of change currently pending against exactly this path.
    pub fn pending_changes(&self) -> Result<Vec<PendingChangeKind>> {
        let kinds = self
            .gateway
            .pending_changes(
                &self.workspace,
                &self.path,
                RecursionType::None,
                false,
                &self.events,
            )
            .map_err(|e| self.server_error(GatewayOperation::PendingChanges, e))?;

        Ok(kinds.into_iter().filter(PendingChangeKind::is_change).collect())
    }

    /// Make the server ready for the caller to delete the file.
    ///
    /// A file already missing locally, or unknown to the server, is tolerated
    /// with a warning. The latter returns without contacting the server.
    pub fn prepare_for_delete(&self) -> Result<Report> {
        let mut warnings = Vec::new();

        if !self.exists_on_filesystem() {
            warn!(path = %self.path, "Deleting a file that is not on the local filesystem");
            warnings.push(Warning::MissingLocally);
        }

        if !self.exists_on_server {
            warn!(path = %self.path, "Deleting a file that does not exist on the server");
            warnings.push(Warning::MissingOnServer);
            return Ok(Report::new(Outcome::NothingOnServer, warnings));
        }

        self.reconcile(PendingChangeKind::Delete, warnings)
    }

    /// Check the file out for editing.
    ///
    /// If the local copy is missing it is fetched from the server first.
    pub fn prepare_for_edit(&self) -> Result<Report> {
        if !self.exists_on_server {
            debug!(path = %self.path, "Refusing to edit a file unknown to the server");
            return Err(Error::NotFoundOnServer {
                path: self.path.to_native(),
            });
        }

        self.reconcile(PendingChangeKind::Edit, Vec::new())
    }

    /// Pend an add for a file that exists locally but not on the server.
    pub fn add_file(&self) -> Result<Report> {
        if !self.exists_on_filesystem() {
            debug!(path = %self.path, "Refusing to add a file missing locally");
            return Err(Error::MissingLocalFile {
                path: self.path.to_native(),
            });
        }
        if self.exists_on_server {
            debug!(path = %self.path, "Refusing to add a file the server already has");
            return Err(Error::AlreadyExistsOnServer {
                path: self.path.to_native(),
            });
        }

        self.pend(PendingChangeKind::Add)?;
        Ok(Report::new(Outcome::Pended(PendingChangeKind::Add), Vec::new()))
    }

    /// Shared tail of edit and delete: short-circuit, undo, sync, pend.
    fn reconcile(&self, desired: PendingChangeKind, warnings: Vec<Warning>) -> Result<Report> {
        let pending = self.pending_changes()?;
        if pending.contains(&desired) {
            debug!(path = %self.path, kind = %desired, "Change already pending");
            return Ok(Report::new(Outcome::AlreadyPending(desired), warnings));
        }

        self.undo_first_mismatch(&pending, desired)?;

        if desired == PendingChangeKind::Edit {
            if !self.exists_on_filesystem() {
                self.refresh_from_server()?;
            }
            if !self.exists_on_filesystem() {
                return Err(Error::MissingLocalFile {
                    path: self.path.to_native(),
                });
            }
        }

        self.pend(desired)?;
        Ok(Report::new(Outcome::Pended(desired), warnings))
    }

    /// Undo the first pending change that is not `desired`.
    ///
    /// Only one kind is pending per path in a normal workspace. The server
    /// restores file content only when the local copy is missing.
    fn undo_first_mismatch(
        &self,
        pending: &[PendingChangeKind],
        desired: PendingChangeKind,
    ) -> Result<()> {
        let Some(conflict) = pending.iter().find(|kind| **kind != desired) else {
            return Ok(());
        };

        let write_to_disk = !self.exists_on_filesystem();
        debug!(
            path = %self.path,
            undoing = %conflict,
            desired = %desired,
            write_to_disk,
            "Undoing conflicting pending change"
        );

        self.gateway
            .undo_pending_change(&self.workspace, &self.path, write_to_disk, &self.events)
            .map_err(|e| self.server_error(GatewayOperation::UndoPendingChange, e))
    }

    /// Download and get latest for this path alone.
    fn refresh_from_server(&self) -> Result<()> {
        debug!(path = %self.path, "Local copy missing, fetching latest from server");

        self.gateway
            .download_latest(&self.path, &self.events)
            .map_err(|e| self.server_error(GatewayOperation::DownloadLatest, e))?;

        self.gateway
            .get_latest(
                &self.workspace,
                &self.path,
                RecursionType::None,
                true,
                &self.events,
            )
            .map_err(|e| self.server_error(GatewayOperation::GetLatest, e))
    }

    fn pend(&self, kind: PendingChangeKind) -> Result<()> {
        let (operation, result) = match kind {
            PendingChangeKind::Edit => (
                GatewayOperation::PendEdit,
                self.gateway.pend_edit(&self.workspace, &self.path, &self.events),
            ),
            PendingChangeKind::Add => (
                GatewayOperation::PendAdd,
                self.gateway.pend_add(&self.workspace, &self.path, &self.events),
            ),
            PendingChangeKind::Delete => (
                GatewayOperation::PendDelete,
                self.gateway.pend_delete(&self.workspace, &self.path, &self.events),
            ),
            PendingChangeKind::None => return Ok(()),
        };

        let result = result.map_err(|e| self.server_error(operation, e))?;
        if !result.is_success() {
            error!(
                path = %self.path,
                kind = %kind,
                code = result.code(),
                "Server refused pend request"
            );
            return Err(Error::PendFailed {
                path: self.path.to_native(),
                kind,
                code: result.code(),
            });
        }

        debug!(path = %self.path, kind = %kind, "Pended change");
        Ok(())
    }

    fn server_error(&self, operation: GatewayOperation, source: GatewayError) -> Error {
        log_server_error(&self.path, operation, source)
    }
}

impl<G, F> std::fmt::Debug for FileHandle<G, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileHandle")
            .field("path", &self.path)
            .field("workspace", &self.workspace)
            .field("exists_on_server", &self.exists_on_server)
            .finish_non_exhaustive()
    }
}

fn log_server_error(
    path: &NormalizedPath,
    operation: GatewayOperation,
    source: GatewayError,
) -> Error {
    error!(path = %path, operation = %operation, "Server communication failed: {}", source);
    Error::ServerCommunication {
        path: path.to_native(),
        operation,
        source,
    }
}

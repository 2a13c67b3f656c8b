//! Error types for checkout-core

use std::path::PathBuf;

use crate::gateway::{GatewayError, GatewayOperation};
use crate::pending::PendingChangeKind;

/// Result type for checkout-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling a file with the server
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No workspace maps the path; the handle cannot be built
    #[error("No workspace maps {path}")]
    NoWorkspace { path: PathBuf },

    /// A gateway call failed
    #[error("Server communication failed during {operation} for {path}: {source}")]
    ServerCommunication {
        path: PathBuf,
        operation: GatewayOperation,
        #[source]
        source: GatewayError,
    },

    #[error("{path} does not exist on the server")]
    NotFoundOnServer { path: PathBuf },

    #[error("{path} already exists on the server")]
    AlreadyExistsOnServer { path: PathBuf },

    #[error("{path} does not exist on the local filesystem")]
    MissingLocalFile { path: PathBuf },

    /// The server answered a pend request with a non-success code
    #[error("Pending {kind} for {path} failed with result code {code}")]
    PendFailed {
        path: PathBuf,
        kind: PendingChangeKind,
        code: i32,
    },

    /// Filesystem error from checkout-fs
    #[error(transparent)]
    Fs(#[from] checkout_fs::Error),
}

impl Error {
    /// Whether this is an operation precondition violation rather than a
    /// server or I/O failure.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NotFoundOnServer { .. }
                | Self::AlreadyExistsOnServer { .. }
                | Self::MissingLocalFile { .. }
        )
    }
}

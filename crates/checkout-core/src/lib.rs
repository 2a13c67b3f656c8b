//! Per-file checkout reconciliation
//!
//! Before a tool edits, adds, or deletes a file in a server-tracked
//! workspace, the server's pending-change table for that path has to agree
//! with the mutation. This crate decides what to undo and what to pend:
//!
//! - **FileHandle**: one path, one workspace, one server-existence snapshot
//! - **VersionControlGateway**: the injected server connection
//! - **Report**: what a prepare operation did, plus soft warnings
//!
//! # Architecture
//!
//! ```text
//!              caller (editor hook, build tool)
//!                         |
//!                   checkout-core
//!                    /          \
//!  VersionControlGateway      checkout-fs::Filesystem
//! ```
//!
//! # Example
//!
//! ```ignore
//! use checkout_core::{FileHandle, Result};
//! use checkout_fs::LocalFilesystem;
//!
//! fn before_save(gateway: &impl checkout_core::VersionControlGateway) -> Result<()> {
//!     let handle = FileHandle::open(gateway, LocalFilesystem::new(), "/ws/src/main.rs")?;
//!     handle.prepare_for_edit()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod handle;
pub mod logging;
pub mod pending;
pub mod report;

pub use config::CheckoutConfig;
pub use error::{Error, Result};
pub use events::{NonFatalError, NonFatalHandler, NonFatalLog};
pub use gateway::{
    DeletedState, GatewayError, GatewayOperation, GatewayResult, ItemKind, RecursionType,
    VersionControlGateway, WorkspaceRef,
};
pub use handle::FileHandle;
pub use pending::{PendResult, PendingChangeKind};
pub use report::{Outcome, Report, Warning};

//! Filesystem abstraction for the checkout reconciler
//!
//! Provides normalized path handling, the local-existence collaborator used by
//! the reconciler, and safe config I/O.

pub mod config;
pub mod error;
pub mod filesystem;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use filesystem::{Filesystem, LocalFilesystem, MemoryFilesystem};
pub use path::NormalizedPath;

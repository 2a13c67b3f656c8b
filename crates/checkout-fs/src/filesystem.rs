//! Local-existence collaborator
//!
//! The reconciler only ever asks one question of the local disk: does this
//! path exist right now. Keeping it behind a trait lets tests swap the disk
//! for an in-memory set.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::NormalizedPath;

/// Answers whether a path is present locally.
///
/// Implementations must not cache: every call reflects the current state.
pub trait Filesystem {
    fn exists(&self, path: &NormalizedPath) -> bool;
}

impl<F: Filesystem + ?Sized> Filesystem for &F {
    fn exists(&self, path: &NormalizedPath) -> bool {
        (**self).exists(path)
    }
}

impl<F: Filesystem + ?Sized> Filesystem for Box<F> {
    fn exists(&self, path: &NormalizedPath) -> bool {
        (**self).exists(path)
    }
}

impl<F: Filesystem + ?Sized> Filesystem for Arc<F> {
    fn exists(&self, path: &NormalizedPath) -> bool {
        (**self).exists(path)
    }
}

/// The real local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl Filesystem for LocalFilesystem {
    fn exists(&self, path: &NormalizedPath) -> bool {
        path.exists()
    }
}

/// In-memory set of present paths.
///
/// Clones share state, so a fake server can "write to disk" through one
/// handle while the reconciler observes through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    files: Arc<Mutex<HashSet<NormalizedPath>>>,
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filesystem already containing `paths`.
    pub fn with_files<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<NormalizedPath>,
    {
        let fs = Self::new();
        for path in paths {
            fs.insert(path);
        }
        fs
    }

    /// Mark a path as present. Returns false if it already was.
    pub fn insert(&self, path: impl Into<NormalizedPath>) -> bool {
        self.lock().insert(path.into())
    }

    /// Mark a path as absent. Returns false if it already was.
    pub fn remove(&self, path: &NormalizedPath) -> bool {
        self.lock().remove(path)
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<NormalizedPath>> {
        // A poisoned set is still a valid set of paths.
        self.files.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Filesystem for MemoryFilesystem {
    fn exists(&self, path: &NormalizedPath) -> bool {
        self.lock().contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let fs = MemoryFilesystem::new();
        let observer = fs.clone();
        let path = NormalizedPath::new("/ws/a.txt");

        assert!(!observer.exists(&path));
        fs.insert(path.clone());
        assert!(observer.exists(&path));
        fs.remove(&path);
        assert!(!observer.exists(&path));
    }

    #[test]
    fn lookups_are_normalized() {
        let fs = MemoryFilesystem::with_files(["/ws/./dir//a.txt"]);
        assert!(fs.exists(&NormalizedPath::new("\\ws\\dir\\a.txt")));
    }
}

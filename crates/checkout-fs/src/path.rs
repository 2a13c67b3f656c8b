//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Backslashes become forward slashes, `.` and empty components are dropped,
/// and `..` pops the previous component. A `..` that would climb above the
/// start of the path is discarded. Paths coming from the server and from the
/// local disk compare equal once both are normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");

        let (prefix, rest) = if let Some(rest) = raw.strip_prefix("//") {
            ("//", rest)
        } else if let Some(rest) = raw.strip_prefix('/') {
            ("/", rest)
        } else {
            ("", raw.as_str())
        };

        let mut components: Vec<&str> = Vec::new();
        for component in rest.split('/') {
            match component {
                "" | "." => {}
                ".." => {
                    components.pop();
                }
                other => components.push(other),
            }
        }

        let body = components.join("/");
        let inner = match (prefix, body.is_empty()) {
            ("", true) => ".".to_string(),
            (p, true) => p.to_string(),
            (p, false) => format!("{p}{body}"),
        };
        Self { inner }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        Self::new(format!("{}/{}", self.inner, segment))
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            Some(0) if trimmed.len() > 1 => Some(Self {
                inner: "/".to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        self.inner
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty() && *name != ".")
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }

    /// Whether `base` is this path or one of its ancestors.
    ///
    /// Compares whole components, so `/ws/src` is not under `/ws/s`.
    pub fn starts_with(&self, base: &NormalizedPath) -> bool {
        self.strip_prefix(base).is_some()
    }

    /// The remainder of this path below `base`, without a leading slash.
    ///
    /// Returns an empty string when the paths are equal and `None` when
    /// `base` is not an ancestor.
    pub fn strip_prefix(&self, base: &NormalizedPath) -> Option<&str> {
        if base.inner == "/" {
            return self.inner.strip_prefix('/');
        }
        let rest = self.inner.strip_prefix(base.inner.as_str())?;
        if rest.is_empty() {
            Some(rest)
        } else {
            rest.strip_prefix('/')
        }
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_stays_root() {
        assert_eq!(NormalizedPath::new("/").as_str(), "/");
        assert_eq!(NormalizedPath::new("/..").as_str(), "/");
    }

    #[test]
    fn empty_relative_becomes_dot() {
        assert_eq!(NormalizedPath::new("").as_str(), ".");
        assert_eq!(NormalizedPath::new("a/..").as_str(), ".");
    }

    #[test]
    fn unc_prefix_is_preserved() {
        let path = NormalizedPath::new("\\\\server\\share\\file.txt");
        assert_eq!(path.as_str(), "//server/share/file.txt");
    }

    #[test]
    fn parent_of_top_level_is_root() {
        let path = NormalizedPath::new("/file.txt");
        assert_eq!(path.parent().unwrap().as_str(), "/");
        assert!(NormalizedPath::new("/").parent().is_none());
    }
}

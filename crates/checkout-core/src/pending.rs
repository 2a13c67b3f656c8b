//! Pending-change model

use serde::{Deserialize, Serialize};

/// The server's notion of an outstanding, uncommitted change against a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingChangeKind {
    None,
    Edit,
    Add,
    Delete,
}

impl PendingChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Edit => "edit",
            Self::Add => "add",
            Self::Delete => "delete",
        }
    }

    /// Whether this records an actual change (anything but `None`).
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for PendingChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw result code of a pend request.
///
/// The server reports the number of items it pended; for a single
/// non-recursive path anything other than exactly one is a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendResult(pub i32);

impl PendResult {
    pub const SUCCESS: PendResult = PendResult(1);

    pub fn code(&self) -> i32 {
        self.0
    }

    pub fn is_success(&self) -> bool {
        *self == Self::SUCCESS
    }
}

impl From<i32> for PendResult {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

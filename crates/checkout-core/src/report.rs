//! What a prepare operation did

use crate::pending::PendingChangeKind;

/// Result of a successful prepare operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The desired change was already pending; nothing was sent.
    AlreadyPending(PendingChangeKind),
    /// The change was pended by this call.
    Pended(PendingChangeKind),
    /// The server has no record of the path, so there is nothing to pend.
    NothingOnServer,
}

/// Soft mismatches that were logged and tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    /// Deleting a file that is already gone from the local disk.
    MissingLocally,
    /// Deleting a file the server does not know about.
    MissingOnServer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub outcome: Outcome,
    pub warnings: Vec<Warning>,
}

impl Report {
    pub(crate) fn new(outcome: Outcome, warnings: Vec<Warning>) -> Self {
        Self { outcome, warnings }
    }

    /// Whether this call sent a pend request to the server.
    pub fn pended(&self) -> bool {
        matches!(self.outcome, Outcome::Pended(_))
    }
}

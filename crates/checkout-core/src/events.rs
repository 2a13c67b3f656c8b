//! Non-fatal events raised by the server mid-call

use std::cell::RefCell;

use checkout_fs::NormalizedPath;

/// A warning-level condition reported by the server during a call.
///
/// Delivered while the call is still in flight and never aborts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonFatalError {
    /// The path the server was working on, when it says.
    pub path: Option<NormalizedPath>,
    pub message: String,
}

impl NonFatalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            path: None,
            message: message.into(),
        }
    }

    pub fn for_path(path: impl Into<NormalizedPath>, message: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for NonFatalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Subscription point passed into every gateway call.
pub trait NonFatalHandler {
    fn on_non_fatal(&self, error: NonFatalError);
}

impl<F: Fn(NonFatalError)> NonFatalHandler for F {
    fn on_non_fatal(&self, error: NonFatalError) {
        self(error)
    }
}

/// Handler that logs each event and keeps it for later inspection.
#[derive(Debug, Default)]
pub struct NonFatalLog {
    events: RefCell<Vec<NonFatalError>>,
}

impl NonFatalLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, oldest first.
    pub fn snapshot(&self) -> Vec<NonFatalError> {
        self.events.borrow().clone()
    }
}

impl NonFatalHandler for NonFatalLog {
    fn on_non_fatal(&self, error: NonFatalError) {
        match &error.path {
            Some(path) => tracing::warn!(path = %path, "Non-fatal server error: {}", error.message),
            None => tracing::warn!("Non-fatal server error: {}", error.message),
        }
        self.events.borrow_mut().push(error);
    }
}

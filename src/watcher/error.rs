//! Error types for the artifact watcher.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from watcher startup and subscription.
///
/// Per-event failures are logged inside the loop and never surface here;
/// only conditions that prevent watching at all do.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to initialize watcher: {reason}")]
    InitFailed { reason: String },

    #[error("Cannot watch root {root}: {reason}")]
    RootWatchFailed { root: PathBuf, reason: String },
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::InitFailed {
            reason: e.to_string(),
        }
    }
}

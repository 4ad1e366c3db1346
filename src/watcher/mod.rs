//! Filesystem watch loop for spreadsheet artifacts.
//!
//! This module owns the single watcher over the configured root and
//! feeds qualifying changes into the stamp pipeline, one at a time.
//!
//! # Architecture
//!
//! ```text
//! ArtifactWatcher
//!   - Single notify::RecommendedWatcher (recursive on the root)
//!   - Subtree exclusions (.git, the mirror output)
//!   - Sequential event loop
//!         |
//!   ArtifactClassifier (accept/reject by name)
//!         |
//!   ArtifactProcessor (copy, resolve revision, stamp)
//! ```

mod artifact;
mod error;
mod event;

pub use artifact::{ArtifactWatcher, ArtifactWatcherBuilder};
pub use error::WatchError;
pub use event::{ChangeEvent, ChangeKind};

pub mod classify;
pub mod cli;
pub mod config;
pub mod logging;
pub mod mapping;
pub mod processor;
pub mod revision;
pub mod watcher;
pub mod workbook;

pub use classify::{ArtifactClassifier, DEFAULT_TRACKED_PATTERN};
pub use config::Settings;
pub use mapping::{DestinationMapper, MapError};
pub use processor::{ArtifactProcessor, ProcessError, StampReport};
pub use revision::{GitRevisionSource, RevisionError, RevisionId, RevisionSource};
pub use watcher::{ArtifactWatcher, ChangeEvent, ChangeKind, WatchError};
pub use workbook::{StampOutcome, VersionStamper, WorkbookError};

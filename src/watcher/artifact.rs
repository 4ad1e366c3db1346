//! The artifact watcher and its event loop.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use notify::{Event, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::classify::ArtifactClassifier;
use crate::processor::ArtifactProcessor;
use crate::workbook::StampOutcome;

use super::error::WatchError;
use super::event::{ChangeEvent, ChangeKind};

/// Watches one directory tree and drives the stamp pipeline.
///
/// Events are consumed strictly in arrival order on a single loop, so a
/// burst of saves to the same artifact can never run its pipeline steps
/// interleaved.
pub struct ArtifactWatcher {
    /// Watched root, absolute.
    root: PathBuf,
    /// Top-level subtree names never descended into.
    excluded: Vec<OsString>,
    classifier: ArtifactClassifier,
    processor: ArtifactProcessor,
    /// Channel for receiving file events.
    event_rx: mpsc::Receiver<notify::Result<Event>>,
    /// The underlying file watcher.
    _watcher: notify::RecommendedWatcher,
}

impl ArtifactWatcher {
    /// Create a builder for configuring the watcher.
    pub fn builder() -> ArtifactWatcherBuilder {
        ArtifactWatcherBuilder::new()
    }

    /// Subscribe to the root and run the event loop.
    ///
    /// Runs until the process is stopped. A root that cannot be watched
    /// is fatal; everything after that is logged and survived.
    pub async fn watch(mut self) -> Result<(), WatchError> {
        self._watcher
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|e| WatchError::RootWatchFailed {
                root: self.root.clone(),
                reason: e.to_string(),
            })?;

        crate::log_event!("watcher", "watching", "{}", self.root.display());

        while let Some(res) = self.event_rx.recv().await {
            match res {
                Ok(event) => self.handle_event(event).await,
                Err(e) => tracing::error!("[watcher] file watch error: {e}"),
            }
        }

        Ok(())
    }

    /// Fan one notify event out into per-path changes.
    async fn handle_event(&self, event: Event) {
        let Some(kind) = ChangeKind::from_notify(&event.kind) else {
            return;
        };
        for path in event.paths {
            self.handle_change(ChangeEvent { path, kind }).await;
        }
    }

    async fn handle_change(&self, change: ChangeEvent) {
        if self.is_excluded(&change.path) {
            crate::debug_event!("watcher", "excluded", "{}", change.path.display());
            return;
        }

        crate::debug_event!(
            "watcher",
            "event",
            "{:?} {}",
            change.kind,
            change.path.display()
        );

        if !self.classifier.qualifies(&change.path, change.kind) {
            return;
        }

        crate::log_event!("watcher", "artifact updated", "{}", change.path.display());

        match self.processor.process(&change.path).await {
            Ok(report) => match report.outcome {
                StampOutcome::Stamped => crate::log_event!(
                    "watcher",
                    "stamped",
                    "{} as {} in {} ms",
                    report.destination.display(),
                    report.revision,
                    report.elapsed_ms
                ),
                // Already reported by the processor.
                StampOutcome::SheetMissing => {}
            },
            Err(e) => {
                tracing::error!("[watcher] {} not mirrored: {e}", change.path.display());
            }
        }
    }

    fn is_excluded(&self, path: &Path) -> bool {
        excluded_by_name(&self.root, &self.excluded, path)
    }
}

/// True when the path's first component under the root is an excluded
/// subtree name. Paths outside the root cannot be mapped and count as
/// excluded too.
fn excluded_by_name(root: &Path, excluded: &[OsString], path: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return true;
    };
    match relative.components().next() {
        Some(Component::Normal(first)) => excluded.iter().any(|name| name.as_os_str() == first),
        _ => false,
    }
}

/// Builder for constructing an ArtifactWatcher.
pub struct ArtifactWatcherBuilder {
    root: Option<PathBuf>,
    excluded: Vec<OsString>,
    classifier: ArtifactClassifier,
    processor: Option<ArtifactProcessor>,
}

impl ArtifactWatcherBuilder {
    pub fn new() -> Self {
        Self {
            root: None,
            excluded: Vec::new(),
            classifier: ArtifactClassifier::new(),
            processor: None,
        }
    }

    /// Set the watched root. Must already be canonical.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Add top-level subtree names to skip.
    pub fn exclude(mut self, names: impl IntoIterator<Item = impl Into<OsString>>) -> Self {
        self.excluded.extend(names.into_iter().map(Into::into));
        self
    }

    /// Replace the default artifact classifier.
    pub fn classifier(mut self, classifier: ArtifactClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Set the pipeline processor.
    pub fn processor(mut self, processor: ArtifactProcessor) -> Self {
        self.processor = Some(processor);
        self
    }

    /// Build the ArtifactWatcher.
    pub fn build(self) -> Result<ArtifactWatcher, WatchError> {
        let root = self.root.ok_or_else(|| WatchError::InitFailed {
            reason: "Watch root is required".to_string(),
        })?;
        let processor = self.processor.ok_or_else(|| WatchError::InitFailed {
            reason: "Processor is required".to_string(),
        })?;

        // Create channel for events
        let (tx, rx) = mpsc::channel(100);

        // Create the notify watcher
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.blocking_send(res);
        })?;

        Ok(ArtifactWatcher {
            root,
            excluded: self.excluded,
            classifier: self.classifier,
            processor,
            event_rx: rx,
            _watcher: watcher,
        })
    }
}

impl Default for ArtifactWatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn excludes_configured_top_level_subtrees() {
        let root = Path::new("/repo");
        let excluded = names(&[".git", "dist"]);
        assert!(excluded_by_name(
            root,
            &excluded,
            Path::new("/repo/dist/Foo_EngData.xlsx")
        ));
        assert!(excluded_by_name(
            root,
            &excluded,
            Path::new("/repo/.git/objects/ab/cdef")
        ));
        assert!(!excluded_by_name(
            root,
            &excluded,
            Path::new("/repo/sheets/Foo_EngData.xlsx")
        ));
    }

    #[test]
    fn exclusion_matches_whole_component_names() {
        let root = Path::new("/repo");
        let excluded = names(&["dist"]);
        // "distribution" is a different subtree.
        assert!(!excluded_by_name(
            root,
            &excluded,
            Path::new("/repo/distribution/Foo_EngData.xlsx")
        ));
        // Nested directories named like an exclusion are fine.
        assert!(!excluded_by_name(
            root,
            &excluded,
            Path::new("/repo/sheets/dist/Foo_EngData.xlsx")
        ));
    }

    #[test]
    fn paths_outside_the_root_are_excluded() {
        let root = Path::new("/repo");
        assert!(excluded_by_name(root, &[], Path::new("/other/file.xlsx")));
    }

    #[test]
    fn build_requires_root_and_processor() {
        assert!(matches!(
            ArtifactWatcher::builder().build(),
            Err(WatchError::InitFailed { .. })
        ));
        assert!(matches!(
            ArtifactWatcher::builder().root("/repo").build(),
            Err(WatchError::InitFailed { .. })
        ));
    }
}

//! Watch command.

use std::path::PathBuf;
use std::sync::Arc;

use crate::classify::ArtifactClassifier;
use crate::config::Settings;
use crate::mapping::DestinationMapper;
use crate::processor::ArtifactProcessor;
use crate::revision::{GitRevisionSource, RevisionSource};
use crate::watcher::ArtifactWatcher;
use crate::workbook::VersionStamper;

/// Run watch command - mirror and stamp artifacts until stopped.
///
/// Startup failures print to stderr and exit non-zero. Once watching,
/// only the process supervisor stops us.
pub async fn run_watch(config: &Settings, root_override: Option<PathBuf>) {
    let root = root_override.unwrap_or_else(|| config.watch_root.clone());

    // The watcher compares event paths against the root, so it must be
    // canonical before anything else sees it.
    let root = match std::fs::canonicalize(&root) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Cannot watch {}: {e}", root.display());
            std::process::exit(1);
        }
    };

    let classifier = match &config.artifact.tracked_pattern {
        Some(pattern) => match ArtifactClassifier::with_pattern(pattern) {
            Ok(classifier) => classifier,
            Err(e) => {
                eprintln!("Invalid artifact.tracked_pattern: {e}");
                std::process::exit(1);
            }
        },
        None => ArtifactClassifier::new(),
    };

    if let Err(e) = config.mirror.validate_output_subtree() {
        eprintln!("Invalid mirror.output_subtree: {e}");
        std::process::exit(1);
    }

    let mapper = DestinationMapper::new(root.clone(), &config.mirror.output_subtree);
    let revision: Arc<dyn RevisionSource> =
        Arc::new(GitRevisionSource::new(root.clone(), config.revision.timeout()));
    let stamper = VersionStamper::new(
        &config.stamp.worksheet,
        &config.stamp.cell,
        &config.stamp.label,
    );
    let processor = ArtifactProcessor::new(mapper, revision, stamper);

    let watcher = match ArtifactWatcher::builder()
        .root(root)
        .exclude(config.effective_exclusions())
        .classifier(classifier)
        .processor(processor)
        .build()
    {
        Ok(watcher) => watcher,
        Err(e) => {
            eprintln!("Failed to start watcher: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = watcher.watch().await {
        eprintln!("Watcher error: {e}");
        std::process::exit(1);
    }
}

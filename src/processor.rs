//! The per-artifact mirror and stamp pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::mapping::{DestinationMapper, MapError};
use crate::revision::{RevisionError, RevisionId, RevisionSource};
use crate::workbook::{StampOutcome, VersionStamper, WorkbookError};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("destination mapping failed: {0}")]
    Mapping(#[from] MapError),

    #[error("cannot copy artifact to {destination}: {reason}")]
    Copy {
        destination: PathBuf,
        reason: String,
    },

    #[error("revision resolution failed: {0}")]
    Revision(#[from] RevisionError),

    #[error("stamping failed: {0}")]
    Workbook(#[from] WorkbookError),
}

/// What one pipeline run did, for logging at the call site.
#[derive(Debug, Clone)]
pub struct StampReport {
    pub destination: PathBuf,
    pub revision: RevisionId,
    pub outcome: StampOutcome,
    pub elapsed_ms: u64,
}

/// Runs the full pipeline for one qualifying artifact change.
///
/// All steps that touch a destination file run under that destination's
/// lock, so rapid successive changes to one artifact apply in arrival
/// order instead of interleaving.
pub struct ArtifactProcessor {
    mapper: DestinationMapper,
    revision: Arc<dyn RevisionSource>,
    stamper: VersionStamper,
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl ArtifactProcessor {
    pub fn new(
        mapper: DestinationMapper,
        revision: Arc<dyn RevisionSource>,
        stamper: VersionStamper,
    ) -> Self {
        Self {
            mapper,
            revision,
            stamper,
            locks: DashMap::new(),
        }
    }

    /// Mirror `source` into the output subtree and stamp the copy.
    ///
    /// On failure the destination may hold an unstamped copy; the next
    /// successful run overwrites it.
    pub async fn process(&self, source: &Path) -> Result<StampReport, ProcessError> {
        let started = Instant::now();
        let destination = self.mapper.destination(source)?;

        let lock = self.lock_for(&destination);
        let _guard = lock.lock().await;

        self.copy_into_mirror(source, &destination).await?;

        let revision_started = Instant::now();
        let revision = self.revision.current_revision().await?;
        crate::debug_event!(
            "processor",
            "revision resolved",
            "{} in {} ms",
            revision,
            revision_started.elapsed().as_millis()
        );

        let stamp_started = Instant::now();
        let outcome = self.stamper.stamp(&destination, &revision)?;
        match outcome {
            StampOutcome::Stamped => crate::debug_event!(
                "processor",
                "stamped",
                "{} in {} ms",
                destination.display(),
                stamp_started.elapsed().as_millis()
            ),
            StampOutcome::SheetMissing => crate::log_event!(
                "processor",
                "no version worksheet",
                "{} copied without a stamp",
                destination.display()
            ),
        }

        Ok(StampReport {
            destination,
            revision,
            outcome,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }

    async fn copy_into_mirror(&self, source: &Path, destination: &Path) -> Result<(), ProcessError> {
        let copy_started = Instant::now();
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ProcessError::Copy {
                    destination: destination.to_path_buf(),
                    reason: e.to_string(),
                })?;
        }
        tokio::fs::copy(source, destination)
            .await
            .map_err(|e| ProcessError::Copy {
                destination: destination.to_path_buf(),
                reason: e.to_string(),
            })?;
        crate::debug_event!(
            "processor",
            "copied",
            "{} in {} ms",
            destination.display(),
            copy_started.elapsed().as_millis()
        );
        Ok(())
    }

    /// One lock per destination path for the lifetime of the process.
    /// The map stays small because the tracked artifact set does.
    fn lock_for(&self, destination: &Path) -> Arc<Mutex<()>> {
        self.locks
            .entry(destination.to_path_buf())
            .or_default()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revision::RevisionError;
    use async_trait::async_trait;

    struct NoRevision;

    #[async_trait]
    impl RevisionSource for NoRevision {
        async fn current_revision(&self) -> Result<RevisionId, RevisionError> {
            Err(RevisionError::Unavailable {
                reason: "unused".into(),
            })
        }
    }

    fn processor() -> ArtifactProcessor {
        ArtifactProcessor::new(
            DestinationMapper::new("/repo", "dist"),
            Arc::new(NoRevision),
            VersionStamper::new("Version", "G3", "GIT_COMMMIT_ID: "),
        )
    }

    #[test]
    fn lock_is_shared_per_destination() {
        let p = processor();
        let a = p.lock_for(Path::new("/repo/dist/a.xlsx"));
        let b = p.lock_for(Path::new("/repo/dist/a.xlsx"));
        let c = p.lock_for(Path::new("/repo/dist/b.xlsx"));
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[tokio::test]
    async fn rejects_sources_outside_the_root() {
        let err = processor()
            .process(Path::new("/elsewhere/Foo_EngData.xlsx"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::Mapping(_)));
    }
}

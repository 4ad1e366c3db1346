//! Revision resolution through the source-control collaborator.
//!
//! The stamped identifier is whatever `git rev-parse HEAD` prints for the
//! watched working tree, surrounding whitespace removed. The lookup runs
//! under a bounded timeout so a wedged subprocess cannot stall the event
//! loop forever.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

/// Opaque revision identifier, trimmed of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionId(String);

impl RevisionId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug)]
pub enum RevisionError {
    /// The source-control binary could not be spawned at all.
    #[error("source control unavailable: {reason}")]
    Unavailable { reason: String },

    /// The lookup ran but reported failure, typically because the watched
    /// root is not a working tree or has no commits yet.
    #[error("revision lookup failed in {work_tree}: {stderr}")]
    LookupFailed { work_tree: PathBuf, stderr: String },

    /// The subprocess did not finish within the configured limit.
    #[error("revision lookup timed out after {timeout:?}")]
    TimedOut { timeout: Duration },

    /// The lookup succeeded but printed nothing usable.
    #[error("revision lookup produced an empty identifier")]
    EmptyOutput,
}

/// Where the current revision identifier comes from.
///
/// The watch pipeline only sees this trait, which keeps stamping
/// deterministic under test.
#[async_trait]
pub trait RevisionSource: Send + Sync {
    async fn current_revision(&self) -> Result<RevisionId, RevisionError>;
}

/// Resolves the head revision of a git working tree.
pub struct GitRevisionSource {
    work_tree: PathBuf,
    timeout: Duration,
}

impl GitRevisionSource {
    pub fn new(work_tree: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            work_tree: work_tree.into(),
            timeout,
        }
    }

    async fn rev_parse_head(&self) -> Result<RevisionId, RevisionError> {
        let output = Command::new("git")
            .args(["rev-parse", "HEAD"])
            .current_dir(&self.work_tree)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| RevisionError::Unavailable {
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(RevisionError::LookupFailed {
                work_tree: self.work_tree.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let id = RevisionId::new(String::from_utf8_lossy(&output.stdout));
        if id.as_str().is_empty() {
            return Err(RevisionError::EmptyOutput);
        }
        Ok(id)
    }
}

#[async_trait]
impl RevisionSource for GitRevisionSource {
    async fn current_revision(&self) -> Result<RevisionId, RevisionError> {
        match tokio::time::timeout(self.timeout, self.rev_parse_head()).await {
            Ok(result) => result,
            Err(_) => Err(RevisionError::TimedOut {
                timeout: self.timeout,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(RevisionId::new("abc123\n").as_str(), "abc123");
        assert_eq!(RevisionId::new("  abc123  ").as_str(), "abc123");
        assert_eq!(RevisionId::new("abc123").to_string(), "abc123");
    }

    fn git_available() -> bool {
        std::process::Command::new("git")
            .arg("--version")
            .output()
            .is_ok_and(|out| out.status.success())
    }

    fn git(dir: &Path, args: &[&str]) {
        let out = std::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(
            out.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&out.stderr)
        );
    }

    #[tokio::test]
    async fn resolves_head_of_a_real_working_tree() {
        if !git_available() {
            eprintln!("git not installed, skipping");
            return;
        }
        let dir = TempDir::new().unwrap();
        git(dir.path(), &["init", "--quiet"]);
        git(dir.path(), &["config", "user.email", "dev@example.com"]);
        git(dir.path(), &["config", "user.name", "Dev"]);
        git(
            dir.path(),
            &[
                "-c",
                "commit.gpgsign=false",
                "commit",
                "--allow-empty",
                "-m",
                "init",
            ],
        );

        let source = GitRevisionSource::new(dir.path(), Duration::from_secs(10));
        let id = source.current_revision().await.unwrap();
        assert_eq!(id.as_str().len(), 40);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn fails_outside_a_working_tree() {
        let dir = TempDir::new().unwrap();
        let source = GitRevisionSource::new(dir.path(), Duration::from_secs(10));
        assert!(source.current_revision().await.is_err());
    }
}

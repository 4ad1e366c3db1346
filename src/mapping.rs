//! Source to mirror path mapping.
//!
//! Every artifact keeps its position relative to the watched root; the
//! mirror lives in a dedicated subtree directly under that root.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    /// The changed path does not live under the watched root. Prefix
    /// comparison is component-wise, so a sibling directory whose name
    /// merely starts with the root is rejected too.
    #[error("path {path} is outside the watched root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

/// Maps source artifact paths into the output mirror subtree.
#[derive(Debug, Clone)]
pub struct DestinationMapper {
    root: PathBuf,
    output_subtree: String,
}

impl DestinationMapper {
    pub fn new(root: impl Into<PathBuf>, output_subtree: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            output_subtree: output_subtree.into(),
        }
    }

    /// Position of a source path relative to the watched root.
    pub fn relative<'p>(&self, source: &'p Path) -> Result<&'p Path, MapError> {
        source
            .strip_prefix(&self.root)
            .map_err(|_| MapError::OutsideRoot {
                path: source.to_path_buf(),
                root: self.root.clone(),
            })
    }

    /// Mirror destination for a source path.
    ///
    /// `<root>/sheets/a/Foo_EngData.xlsx` maps to
    /// `<root>/<output>/sheets/a/Foo_EngData.xlsx`.
    pub fn destination(&self, source: &Path) -> Result<PathBuf, MapError> {
        let relative = self.relative(source)?;
        Ok(self.root.join(&self.output_subtree).join(relative))
    }
}

//! Workbook access for version stamping.
//!
//! The stamper performs a full read, modify, write cycle on the mirror
//! copy. The source artifact is never opened for writing.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::revision::RevisionId;

#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("cannot read workbook {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("cannot write workbook {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// Result of a stamping attempt on one workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampOutcome {
    /// The version cell was written and the workbook saved.
    Stamped,
    /// The workbook has no version worksheet; it was left as copied.
    SheetMissing,
}

/// Writes the revision marker into a workbook's version cell.
#[derive(Debug, Clone)]
pub struct VersionStamper {
    worksheet: String,
    cell: String,
    label: String,
}

impl VersionStamper {
    pub fn new(
        worksheet: impl Into<String>,
        cell: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            worksheet: worksheet.into(),
            cell: cell.into(),
            label: label.into(),
        }
    }

    /// The exact cell text produced for a revision.
    pub fn marker_for(&self, revision: &RevisionId) -> String {
        format!("{}{}", self.label, revision.as_str())
    }

    /// Load the workbook at `path`, write the marker into the configured
    /// cell and save it back in place.
    ///
    /// A missing version worksheet is an outcome, not an error: the
    /// already-copied file stays byte-identical to the source.
    pub fn stamp(&self, path: &Path, revision: &RevisionId) -> Result<StampOutcome, WorkbookError> {
        let mut book = umya_spreadsheet::reader::xlsx::read(path).map_err(|e| WorkbookError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let Some(sheet) = book.get_sheet_by_name_mut(&self.worksheet) else {
            return Ok(StampOutcome::SheetMissing);
        };
        sheet.get_cell_mut(self.cell.as_str()).set_value(self.marker_for(revision));

        umya_spreadsheet::writer::xlsx::write(&book, path).map_err(|e| WorkbookError::Write {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(StampOutcome::Stamped)
    }
}

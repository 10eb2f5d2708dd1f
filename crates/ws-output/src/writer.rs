//! The `OutputWriter` trait implemented by all backend writers.

use std::path::Path;

use crate::{DaySummaryRow, OutputError, OutputResult, StageTotalRow, WardSnapshotRow};

/// Trait implemented by CSV, SQLite, and Parquet writers.
///
/// Errors are not surfaced through the sim; [`SimOutputObserver`] keeps the
/// first one for [`take_error`].
///
/// [`SimOutputObserver`]: crate::SimOutputObserver
/// [`take_error`]: crate::SimOutputObserver::take_error
pub trait OutputWriter {
    /// Write one day summary row.
    fn write_day_summary(&mut self, row: &DaySummaryRow) -> OutputResult<()>;

    /// Write the per-stage totals of one day.
    fn write_stage_totals(&mut self, rows: &[StageTotalRow]) -> OutputResult<()>;

    /// Write a batch of per-ward snapshot rows.
    fn write_ward_snapshot(&mut self, rows: &[WardSnapshotRow]) -> OutputResult<()>;

    /// Flush and close all underlying handles.  Calling it again is a no-op.
    fn finish(&mut self) -> OutputResult<()>;
}

/// Fail early, before any file is created, if `dir` is not a directory.
pub(crate) fn ensure_dir(dir: &Path) -> OutputResult<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(OutputError::MissingDirectory(dir.to_path_buf()))
    }
}

//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `day_summaries.csv`
//! - `stage_totals.csv`
//! - `ward_snapshots.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::{OutputWriter, ensure_dir};
use crate::{DaySummaryRow, OutputResult, StageTotalRow, WardSnapshotRow};

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    summaries: Writer<File>,
    totals:    Writer<File>,
    snapshots: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create the three CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        ensure_dir(dir)?;

        let mut summaries = Writer::from_path(dir.join("day_summaries.csv"))?;
        summaries.write_record([
            "day", "susceptible", "infected", "removed", "new_infections", "seeded", "imported",
        ])?;

        let mut totals = Writer::from_path(dir.join("stage_totals.csv"))?;
        totals.write_record(["day", "stage", "count"])?;

        let mut snapshots = Writer::from_path(dir.join("ward_snapshots.csv"))?;
        snapshots.write_record(["day", "ward", "pool", "stage", "count"])?;

        Ok(Self { summaries, totals, snapshots, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_day_summary(&mut self, row: &DaySummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.day.to_string(),
            row.susceptible.to_string(),
            row.infected.to_string(),
            row.removed.to_string(),
            row.new_infections.to_string(),
            row.seeded.to_string(),
            row.imported.to_string(),
        ])?;
        Ok(())
    }

    fn write_stage_totals(&mut self, rows: &[StageTotalRow]) -> OutputResult<()> {
        for row in rows {
            self.totals.write_record(&[
                row.day.to_string(),
                row.stage.to_string(),
                row.count.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_ward_snapshot(&mut self, rows: &[WardSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.day.to_string(),
                row.ward.to_string(),
                row.pool.as_str().to_owned(),
                row.stage.to_string(),
                row.count.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.summaries.flush()?;
        self.totals.flush()?;
        self.snapshots.flush()?;
        Ok(())
    }
}

//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use log::{debug, info};

use ws_core::Day;
use ws_infection::InfectionState;
use ws_network::WardNetwork;
use ws_sim::{DayRecord, RunSummary, SimObserver};

use crate::row::{DaySummaryRow, StageTotalRow, WardSnapshotRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes day summaries, stage totals and ward
/// snapshots to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:        W,
    snapshot_rows: u64,
    last_error:    Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, snapshot_rows: 0, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Finish the writer outside [`Sim::run`](ws_sim::Sim::run), e.g. after
    /// driving the sim with `days()` or `run_days`.
    pub fn finish(&mut self) -> OutputResult<()> {
        self.writer.finish()
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_day_end(&mut self, record: &DayRecord) {
        let result = self.writer.write_day_summary(&DaySummaryRow::from_record(record));
        self.store_err(result);
        let result = self.writer.write_stage_totals(&StageTotalRow::from_record(record));
        self.store_err(result);
    }

    fn on_snapshot(&mut self, day: Day, state: &InfectionState, _network: &WardNetwork) {
        let rows = WardSnapshotRow::collect(day, state);
        debug!("{day}: writing {} ward snapshot rows", rows.len());
        if !rows.is_empty() {
            self.snapshot_rows += rows.len() as u64;
            let result = self.writer.write_ward_snapshot(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, summary: &RunSummary) {
        let result = self.writer.finish();
        self.store_err(result);
        info!(
            "output closed: {} days, {} snapshot rows{}",
            summary.days_run,
            self.snapshot_rows,
            if self.last_error.is_some() { " (with errors)" } else { "" },
        );
    }
}

//! Simulation observer trait for progress reporting and data collection.

use ws_core::Day;
use ws_infection::InfectionState;
use ws_network::WardNetwork;

use crate::{DayRecord, RunSummary};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at day boundaries.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter;
///
/// impl SimObserver for ProgressPrinter {
///     fn on_day_end(&mut self, record: &DayRecord) {
///         println!("{}: {} infected", record.day, record.infected);
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called before anything happens on `day`.
    fn on_day_start(&mut self, _day: Day) {}

    /// Called once the day has passed its conservation check.
    fn on_day_end(&mut self, _record: &DayRecord) {}

    /// Called every `config.snapshot_interval_days` days, after
    /// [`on_day_end`](Self::on_day_end).
    ///
    /// Provides read-only access to the full per-ward state so that output
    /// writers can record a snapshot without the sim knowing about any
    /// specific format.
    fn on_snapshot(
        &mut self,
        _day:     Day,
        _state:   &InfectionState,
        _network: &WardNetwork,
    ) {}

    /// Called once after the final day.
    fn on_sim_end(&mut self, _summary: &RunSummary) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

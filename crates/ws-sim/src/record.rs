//! Per-day and per-run results.

use ws_core::{Day, StageId};

use crate::SimError;

/// What happened on one simulated day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayRecord {
    pub day: Day,
    /// End-of-day count per stage over every ward and pool; index 0 is
    /// susceptible, the last entry is removed.
    pub stage_totals: Vec<u64>,
    /// Susceptibles infected by transmission today.
    pub new_infections: u64,
    /// Susceptibles moved by the seed schedule today.
    pub seeded: u64,
    /// Susceptibles moved by random imports today.
    pub imported: u64,
    /// End-of-day count of every disease stage except removed.
    pub infected: u64,
}

impl DayRecord {
    #[inline]
    pub fn susceptible(&self) -> u64 {
        self.stage_totals.first().copied().unwrap_or(0)
    }

    #[inline]
    pub fn removed(&self) -> u64 {
        self.stage_totals.last().copied().unwrap_or(0)
    }

    pub fn stage(&self, stage: StageId) -> u64 {
        self.stage_totals.get(stage.index()).copied().unwrap_or(0)
    }

    /// Everybody who entered the disease today, by any route.
    pub fn arrivals(&self) -> u64 {
        self.new_infections + self.seeded + self.imported
    }
}

/// Why a run stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// `SimConfig::max_days` days were simulated.
    MaxDays,
    /// Nobody was infected, no imports were configured and no seed was left.
    OutbreakOver,
}

/// Aggregate view of a finished run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub days_run:         u32,
    pub last_day:         Option<Day>,
    pub final_totals:     Vec<u64>,
    /// Sum of [`DayRecord::arrivals`] over the run.
    pub total_infections: u64,
    pub peak_infected:    u64,
    pub peak_day:         Option<Day>,
    pub stop:             Option<StopReason>,
}

impl RunSummary {
    pub(crate) fn new() -> Self {
        Self {
            days_run:         0,
            last_day:         None,
            final_totals:     Vec::new(),
            total_infections: 0,
            peak_infected:    0,
            peak_day:         None,
            stop:             None,
        }
    }

    pub(crate) fn absorb(&mut self, record: &DayRecord) {
        self.days_run += 1;
        self.last_day = Some(record.day);
        self.final_totals.clone_from(&record.stage_totals);
        self.total_infections += record.arrivals();
        if self.peak_day.is_none() || record.infected > self.peak_infected {
            self.peak_infected = record.infected;
            self.peak_day = Some(record.day);
        }
    }

    /// Summarise a sequence of records.
    pub fn from_records(records: &[DayRecord], stop: Option<StopReason>) -> Self {
        let mut summary = Self::new();
        for r in records {
            summary.absorb(r);
        }
        summary.stop = stop;
        summary
    }
}

/// Every record produced before the run ended, plus the error that ended
/// it early (if any).
#[derive(Debug)]
pub struct RunOutput {
    pub records: Vec<DayRecord>,
    pub error:   Option<SimError>,
}

impl RunOutput {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

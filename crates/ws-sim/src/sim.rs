//! The `Sim` struct and its day loop.

use std::iter::FusedIterator;

use log::{debug, info, warn};

use ws_core::{Day, ParameterSet, RandomStream, SimConfig, StageId, WardId};
use ws_infection::{ConsistencyError, ImportSeeder, InfectionState, Pool, SeedSchedule};
use ws_movement::PlayMatrix;
use ws_network::WardNetwork;

use crate::transmission::{Transmission, WardOutcome};
use crate::{DayRecord, RunOutput, RunSummary, SimError, SimObserver, SimResult, StopReason};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim` owns the infection state for the whole run and advances it one day
/// at a time:
///
/// 0. **Dawn**: snapshot the stage counts.
/// 1. **Seeds**: apply the seed schedule for the day.
/// 2. **Imports**: random imports from the master stream.
/// 3. **Transmission** (optionally parallel with the `parallel` feature):
///    force of infection from the dawn counts, then per-ward binomial draws
///    from a `WardStream` seeded by one master-stream draw.
/// 4. **Progression**: per-ward binomial draws on the dawn counts, from the
///    same `WardStream`.
/// 5. **Apply & check** (sequential, ascending `WardId` for determinism):
///    progressions and new infections are written back, then the state is
///    checked for conservation.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    /// Run length and snapshot settings.
    pub config: SimConfig,

    /// The frozen parameters this run was initialised with.
    pub params: ParameterSet,

    /// The ward graph.  Read-only for the whole run.
    pub network: WardNetwork,

    /// Play destinations rescaled for `params`.
    pub play_matrix: PlayMatrix,

    pub(crate) state:        InfectionState,
    pub(crate) schedule:     SeedSchedule,
    pub(crate) seeder:       ImportSeeder,
    pub(crate) transmission: Transmission,
    pub(crate) rng:          RandomStream,
    pub(crate) next_day:     Day,
    pub(crate) stopped:      Option<StopReason>,
    pub(crate) failed:       bool,

    #[cfg(feature = "parallel")]
    pub(crate) pool:         Option<rayon::ThreadPool>,
}

impl Sim {
    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> &InfectionState {
        &self.state
    }

    #[inline]
    pub fn schedule(&self) -> &SeedSchedule {
        &self.schedule
    }

    /// The day the next call to [`step`](Self::step) will simulate.
    #[inline]
    pub fn next_day(&self) -> Day {
        self.next_day
    }

    /// `true` once the run has terminated or failed.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.stopped.is_some() || self.failed
    }

    #[inline]
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stopped
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Simulate the next day unless the run has finished.
    ///
    /// Returns `Ok(None)` once the run is over.  After an error every
    /// further call returns `Ok(None)`.
    pub fn step(&mut self) -> SimResult<Option<DayRecord>> {
        if self.is_finished() {
            return Ok(None);
        }
        if self.next_day >= self.config.end_day() {
            self.stopped = Some(StopReason::MaxDays);
            return Ok(None);
        }
        let record = match self.advance_day() {
            Ok(r) => r,
            Err(e) => {
                self.failed = true;
                return Err(e);
            }
        };
        if self.next_day >= self.config.end_day() {
            self.stopped = Some(StopReason::MaxDays);
        } else if self.outbreak_over(&record) {
            self.stopped = Some(StopReason::OutbreakOver);
        }
        Ok(Some(record))
    }

    /// Lazily iterate over the remaining days.
    ///
    /// The iterator ends at termination and after yielding the first error.
    /// A run cannot be restarted: once exhausted, later calls yield nothing.
    pub fn days(&mut self) -> Days<'_> {
        Days { sim: self, done: false }
    }

    /// Run to termination, reporting to `observer`.
    ///
    /// Calls observer hooks at every day boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    /// A failed day still ends with `on_sim_end`, carrying the days that
    /// completed and no stop reason.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunSummary> {
        let mut summary = RunSummary::new();
        while !self.is_finished() {
            let day = self.next_day;
            if day < self.config.end_day() {
                observer.on_day_start(day);
            }
            let record = match self.step() {
                Ok(Some(record)) => record,
                Ok(None) => break,
                Err(e) => {
                    warn!("run failed after {} days: {e}", summary.days_run);
                    observer.on_sim_end(&summary);
                    return Err(e);
                }
            };
            self.report(&record, observer);
            summary.absorb(&record);
        }
        summary.stop = self.stopped;
        info!(
            "run finished after {} days ({:?}): {} infections in total, peak {} infected",
            summary.days_run, summary.stop, summary.total_infections, summary.peak_infected,
        );
        observer.on_sim_end(&summary);
        Ok(summary)
    }

    /// Run to termination, keeping every record and the error (if any) that
    /// ended the run early.
    pub fn collect(&mut self) -> RunOutput {
        let mut records = Vec::new();
        let mut error = None;
        for result in self.days() {
            match result {
                Ok(r) => records.push(r),
                Err(e) => error = Some(e),
            }
        }
        RunOutput { records, error }
    }

    /// Simulate exactly `n` days from the current position, ignoring
    /// `max_days` and the outbreak-over rule.
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_days<O: SimObserver>(&mut self, n: u32, observer: &mut O) -> SimResult<Vec<DayRecord>> {
        if self.failed {
            return Ok(Vec::new());
        }
        let mut records = Vec::with_capacity(n as usize);
        for _ in 0..n {
            observer.on_day_start(self.next_day);
            let record = self.advance_day().inspect_err(|_| self.failed = true)?;
            self.report(&record, observer);
            records.push(record);
        }
        Ok(records)
    }

    // ── Core day processing ───────────────────────────────────────────────

    fn report<O: SimObserver>(&self, record: &DayRecord, observer: &mut O) {
        observer.on_day_end(record);
        if self.config.snapshot_due(record.day) {
            observer.on_snapshot(record.day, &self.state, &self.network);
        }
    }

    fn outbreak_over(&self, record: &DayRecord) -> bool {
        record.infected == 0
            && self.seeder.daily_imports() == 0.0
            && !self.schedule.has_after(record.day)
    }

    fn advance_day(&mut self) -> SimResult<DayRecord> {
        let day = self.next_day;

        // ── Phase 0: dawn snapshot ────────────────────────────────────────
        let dawn = self.state.clone();

        // ── Phase 1: seeds ────────────────────────────────────────────────
        let seeded = self.seeder.apply_seeds(&mut self.state, &self.schedule, day)?;

        // ── Phase 2: imports (master stream) ──────────────────────────────
        let imported = self
            .seeder
            .apply_imports(&mut self.state, &mut self.rng)
            .map_err(|e| SimError::consistency(day, e, &self.state))?;

        // ── Phase 3–4: per-ward draws (read-only, maybe parallel) ─────────
        //
        // Probabilities use the dawn counts only.  The single day seed is the
        // last master-stream draw of the day; ward streams derive from it.
        let probabilities = self.transmission.infection_probabilities(&dawn);
        let day_seed = self.rng.next_seed();
        let outcomes = self.compute_outcomes(&dawn, &probabilities, day_seed);

        // ── Phase 5: apply (sequential, ascending WardId) ─────────────────
        let new_infections = self
            .apply_outcomes(&outcomes)
            .map_err(|e| SimError::consistency(day, e, &self.state))?;

        self.state
            .check_conservation(&self.network)
            .map_err(|e| SimError::consistency(day, e, &self.state))?;

        let record = DayRecord {
            day,
            stage_totals: self.state.stage_totals(),
            new_infections,
            seeded,
            imported,
            infected: self.state.infected_total(),
        };
        debug!(
            "{day}: {} new, {} seeded, {} imported, {} infected",
            record.new_infections, record.seeded, record.imported, record.infected
        );

        self.next_day = day.next();
        Ok(record)
    }

    fn compute_outcomes(
        &self,
        dawn:          &InfectionState,
        probabilities: &[[f64; 2]],
        day_seed:      u64,
    ) -> Vec<WardOutcome> {
        // Explicit field borrows so the closures only capture shared data.
        let transmission = &self.transmission;
        let current      = &self.state;

        #[cfg(not(feature = "parallel"))]
        {
            probabilities
                .iter()
                .enumerate()
                .map(|(w, &p)| {
                    transmission.ward_outcome(WardId(w as u32), dawn, current, p, day_seed)
                })
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let compute = || -> Vec<WardOutcome> {
                probabilities
                    .par_iter()
                    .enumerate()
                    .map(|(w, &p)| {
                        transmission.ward_outcome(WardId(w as u32), dawn, current, p, day_seed)
                    })
                    .collect()
            };
            match &self.pool {
                Some(pool) => pool.install(compute),
                None => compute(),
            }
        }
    }

    /// Write progressions and new infections back; returns new infections.
    fn apply_outcomes(&mut self, outcomes: &[WardOutcome]) -> Result<u64, ConsistencyError> {
        let last = self.state.stage_count().saturating_sub(1);
        let mut new_infections = 0;
        for (w, outcome) in outcomes.iter().enumerate() {
            let ward = WardId(w as u32);
            for (i, pool) in Pool::ALL.into_iter().enumerate() {
                let progressions = &outcome.progressions[i];
                for s in 1..last {
                    let from = StageId(s as u8);
                    self.state.transfer(pool, ward, from, from.next(), progressions[s])?;
                }
                let n = outcome.infections[i];
                self.state.transfer(pool, ward, StageId::SUSCEPTIBLE, StageId::FIRST_INFECTED, n)?;
                new_infections += n;
            }
        }
        Ok(new_infections)
    }
}

// ── Days ──────────────────────────────────────────────────────────────────────

/// Iterator returned by [`Sim::days`].
pub struct Days<'a> {
    sim:  &'a mut Sim,
    done: bool,
}

impl Iterator for Days<'_> {
    type Item = SimResult<DayRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.sim.step() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for Days<'_> {}

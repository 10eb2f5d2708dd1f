//! Seed schedule and the daily seeding / import step.
//!
//! # Seed file
//!
//! ```csv
//! # ward,day,count
//! ward,day,count
//! 0,0,10
//! 4,3,2
//! ```
//!
//! Each row moves `count` susceptibles of `ward` into the disease's seed
//! stage at the start of `day`.  Seeds always land in the home pool.

use std::io::Read;
use std::path::Path;

use log::{debug, trace, warn};
use serde::Deserialize;

use ws_core::{DataResult, Day, ParameterSet, RandomStream, Sampler, SeedPolicy, StageId, WardId};
use ws_network::read_table;

use crate::{ConsistencyError, InfectionState, Pool, SeedError, SeedResult};

// ── SeedRecord ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SeedRecord {
    pub ward:  WardId,
    pub day:   Day,
    pub count: u64,
}

impl SeedRecord {
    pub fn new(ward: WardId, day: Day, count: u64) -> Self {
        Self { ward, day, count }
    }
}

#[derive(Deserialize)]
struct SeedRow {
    ward:  u32,
    day:   u32,
    count: u64,
}

/// Read seed records from a CSV file.
pub fn read_done_file(path: &Path) -> DataResult<Vec<SeedRecord>> {
    let file = std::fs::File::open(path)?;
    read_done_reader(file)
}

/// Like [`read_done_file`] but accepts any `Read` source.  Records keep
/// file order.
pub fn read_done_reader<R: Read>(reader: R) -> DataResult<Vec<SeedRecord>> {
    let rows: Vec<SeedRow> = read_table("seeds", reader)?;
    debug!("read {} seed records", rows.len());
    Ok(rows
        .into_iter()
        .map(|r| SeedRecord::new(WardId(r.ward), Day(r.day), r.count))
        .collect())
}

// ── SeedSchedule ──────────────────────────────────────────────────────────────

/// Seed records validated against a network and ordered by day.
///
/// Records for the same day keep their file order.
#[derive(Clone, Debug, Default)]
pub struct SeedSchedule {
    records: Vec<SeedRecord>,
    policy:  SeedPolicy,
}

impl SeedSchedule {
    /// Validate `records` against `ward_count`.
    ///
    /// Under [`SeedPolicy::Strict`] an unknown ward is
    /// [`SeedError::OutOfRange`]; under [`SeedPolicy::Lenient`] it is
    /// dropped with a warning.
    pub fn new(records: Vec<SeedRecord>, ward_count: usize, policy: SeedPolicy) -> SeedResult<Self> {
        let mut kept = Vec::with_capacity(records.len());
        for (index, r) in records.into_iter().enumerate() {
            if r.ward.index() >= ward_count {
                match policy {
                    SeedPolicy::Strict => {
                        return Err(SeedError::OutOfRange { index, ward: r.ward, ward_count });
                    }
                    SeedPolicy::Lenient => {
                        warn!(
                            "skipping seed record {index}: {} is not in the network ({ward_count} wards)",
                            r.ward
                        );
                        continue;
                    }
                }
            }
            kept.push(r);
        }
        // Stable, so same-day records stay in file order.
        kept.sort_by_key(|r| r.day);
        Ok(Self { records: kept, policy })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn policy(&self) -> SeedPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SeedRecord] {
        &self.records
    }

    /// Records scheduled for `day`, in file order.
    pub fn for_day(&self, day: Day) -> &[SeedRecord] {
        let start = self.records.partition_point(|r| r.day < day);
        let end = self.records.partition_point(|r| r.day <= day);
        &self.records[start..end]
    }

    /// `true` if any record falls on a day after `day`.
    pub fn has_after(&self, day: Day) -> bool {
        self.records.last().is_some_and(|r| r.day > day)
    }
}

// ── ImportSeeder ──────────────────────────────────────────────────────────────

/// Applies scheduled seeds and random daily imports.
#[derive(Copy, Clone, Debug)]
pub struct ImportSeeder {
    seed_stage:    StageId,
    daily_imports: f64,
}

impl ImportSeeder {
    pub fn new(params: &ParameterSet) -> Self {
        Self {
            seed_stage:    params.disease.seed_stage,
            daily_imports: params.daily_imports,
        }
    }

    #[inline]
    pub fn seed_stage(&self) -> StageId {
        self.seed_stage
    }

    #[inline]
    pub fn daily_imports(&self) -> f64 {
        self.daily_imports
    }

    /// Apply every record of `schedule` for `day` to the home pool.
    ///
    /// Returns the number of people actually seeded.
    ///
    /// # Errors
    ///
    /// [`SeedError::ExceedsSusceptible`] under the strict policy when a
    /// record asks for more people than the ward's home pool has
    /// susceptible.  Earlier records of the same day stay applied.
    pub fn apply_seeds(
        &self,
        state:    &mut InfectionState,
        schedule: &SeedSchedule,
        day:      Day,
    ) -> SeedResult<u64> {
        let mut seeded = 0;
        for r in schedule.for_day(day) {
            let available = state.susceptible(Pool::Home, r.ward);
            let n = if r.count > available {
                match schedule.policy() {
                    SeedPolicy::Strict => {
                        return Err(SeedError::ExceedsSusceptible {
                            day,
                            ward: r.ward,
                            requested: r.count,
                            available,
                        });
                    }
                    SeedPolicy::Lenient => {
                        warn!(
                            "{day}: clamping seed of {} into {} to {available} susceptibles",
                            r.count, r.ward
                        );
                        available
                    }
                }
            } else {
                r.count
            };
            state.transfer(Pool::Home, r.ward, StageId::SUSCEPTIBLE, self.seed_stage, n)?;
            trace!("{day}: seeded {n} into {}", r.ward);
            seeded += n;
        }
        Ok(seeded)
    }

    /// Draw and apply the day's random imports.
    ///
    /// Wards are visited in ascending order.  Each draws
    /// `Poisson(daily_imports × population / total)` from `rng`, then splits
    /// the arrivals between pools with a binomial weighted by each pool's
    /// susceptibles.  Arrivals are capped at the ward's susceptibles, and a
    /// capped draw fills both pools completely.
    ///
    /// Returns the number of people imported.
    pub fn apply_imports(
        &self,
        state: &mut InfectionState,
        rng:   &mut RandomStream,
    ) -> Result<u64, ConsistencyError> {
        let total = state.total_population();
        if self.daily_imports <= 0.0 || total == 0 {
            return Ok(0);
        }
        let mut imported = 0;
        for w in 0..state.ward_count() as u32 {
            let ward = WardId(w);
            let mean = self.daily_imports * state.population(ward) as f64 / total as f64;
            let n = rng.poisson(mean);
            if n == 0 {
                continue;
            }
            let s_home = state.susceptible(Pool::Home, ward);
            let s_play = state.susceptible(Pool::Play, ward);
            let s_total = s_home + s_play;
            if s_total == 0 {
                continue;
            }
            let n = n.min(s_total);
            let to_home = rng
                .binomial(n, s_home as f64 / s_total as f64)
                .min(s_home)
                .max(n.saturating_sub(s_play));
            let to_play = n - to_home;

            state.transfer(Pool::Home, ward, StageId::SUSCEPTIBLE, self.seed_stage, to_home)?;
            state.transfer(Pool::Play, ward, StageId::SUSCEPTIBLE, self.seed_stage, to_play)?;
            trace!("imported {to_home} home + {to_play} play into {ward}");
            imported += to_home + to_play;
        }
        Ok(imported)
    }
}

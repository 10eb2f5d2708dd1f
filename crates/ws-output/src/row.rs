//! Plain data row types written by output backends.

use ws_core::{Day, WardId};
use ws_infection::{InfectionState, Pool};
use ws_sim::DayRecord;

/// Headline numbers for one simulated day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySummaryRow {
    pub day:            u32,
    pub susceptible:    u64,
    pub infected:       u64,
    pub removed:        u64,
    pub new_infections: u64,
    pub seeded:         u64,
    pub imported:       u64,
}

impl DaySummaryRow {
    pub fn from_record(record: &DayRecord) -> Self {
        Self {
            day:            record.day.0,
            susceptible:    record.susceptible(),
            infected:       record.infected,
            removed:        record.removed(),
            new_infections: record.new_infections,
            seeded:         record.seeded,
            imported:       record.imported,
        }
    }
}

/// Network-wide count of one stage at the end of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTotalRow {
    pub day:   u32,
    pub stage: u8,
    pub count: u64,
}

impl StageTotalRow {
    /// One row per stage, susceptible first.
    pub fn from_record(record: &DayRecord) -> Vec<Self> {
        record
            .stage_totals
            .iter()
            .enumerate()
            .map(|(s, &count)| Self { day: record.day.0, stage: s as u8, count })
            .collect()
    }
}

/// Count of one stage in one pool of one ward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WardSnapshotRow {
    pub day:   u32,
    pub ward:  u32,
    pub pool:  Pool,
    pub stage: u8,
    pub count: u64,
}

impl WardSnapshotRow {
    /// Rows for every non-empty bucket of `state`, ordered by ward, pool,
    /// then stage.
    pub fn collect(day: Day, state: &InfectionState) -> Vec<Self> {
        let mut rows = Vec::new();
        for w in 0..state.ward_count() as u32 {
            let ward = WardId(w);
            for pool in Pool::ALL {
                for (s, &count) in state.stages(pool, ward).iter().enumerate() {
                    if count == 0 {
                        continue;
                    }
                    rows.push(Self { day: day.0, ward: w, pool, stage: s as u8, count });
                }
            }
        }
        rows
    }
}

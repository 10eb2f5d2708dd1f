//! One population pool: stage counts for every ward.
//!
//! # Layout
//!
//! Counts are a flat `Vec<u64>` of `ward_count × stage_count` entries, ward
//! major:
//!
//! ```text
//! counts[ ward * stage_count + stage ]
//! ```
//!
//! so a ward's stage buckets are one contiguous slice.  Stage 0 is
//! susceptible.

use std::fmt;

use ws_core::{ParameterSet, Parameters, StageId, WardId};
use ws_network::WardNetwork;

// ── Pool ──────────────────────────────────────────────────────────────────────

/// Which half of a ward's residents.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pool {
    /// Residents who follow the ward's work links by day.
    Home,
    /// Residents who follow the play matrix by day.
    Play,
}

impl Pool {
    pub const ALL: [Pool; 2] = [Pool::Home, Pool::Play];

    pub fn as_str(self) -> &'static str {
        match self {
            Pool::Home => "home",
            Pool::Play => "play",
        }
    }

    #[inline]
    pub fn other(self) -> Pool {
        match self {
            Pool::Home => Pool::Play,
            Pool::Play => Pool::Home,
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── InfectionPool ─────────────────────────────────────────────────────────────

/// Stage buckets for every ward in one pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InfectionPool {
    kind:        Pool,
    stage_count: usize,
    counts:      Vec<u64>,
    /// Current number of people in this pool, per ward.
    sizes:       Vec<u64>,
}

impl InfectionPool {
    /// Zeroed home pool sized `round(population × home_fraction)` per ward.
    pub fn initialise_home(network: &WardNetwork, params: &ParameterSet) -> Self {
        Self::initialise(Pool::Home, network, params)
    }

    /// Zeroed play pool holding the remainder of each ward.
    pub fn initialise_play(network: &WardNetwork, params: &ParameterSet) -> Self {
        Self::initialise(Pool::Play, network, params)
    }

    fn initialise(kind: Pool, network: &WardNetwork, params: &Parameters) -> Self {
        let sizes = network
            .wards
            .iter()
            .map(|w| pool_share(kind, w.population, params.home_fraction))
            .collect();
        Self::zeroed(kind, sizes, params.disease.stage_count())
    }

    pub(crate) fn zeroed(kind: Pool, sizes: Vec<u64>, stage_count: usize) -> Self {
        Self {
            kind,
            stage_count,
            counts: vec![0; sizes.len() * stage_count],
            sizes,
        }
    }

    #[inline]
    pub fn kind(&self) -> Pool {
        self.kind
    }

    #[inline]
    pub fn ward_count(&self) -> usize {
        self.sizes.len()
    }

    #[inline]
    pub fn stage_count(&self) -> usize {
        self.stage_count
    }

    /// Number of people currently in this pool for `ward`.
    #[inline]
    pub fn size(&self, ward: WardId) -> u64 {
        self.sizes[ward.index()]
    }

    #[inline]
    pub fn stages(&self, ward: WardId) -> &[u64] {
        let start = ward.index() * self.stage_count;
        &self.counts[start..start + self.stage_count]
    }

    #[inline]
    pub fn count(&self, ward: WardId, stage: StageId) -> u64 {
        self.counts[ward.index() * self.stage_count + stage.index()]
    }

    #[inline]
    pub(crate) fn stages_mut(&mut self, ward: WardId) -> &mut [u64] {
        let start = ward.index() * self.stage_count;
        &mut self.counts[start..start + self.stage_count]
    }

    #[inline]
    pub(crate) fn size_mut(&mut self, ward: WardId) -> &mut u64 {
        &mut self.sizes[ward.index()]
    }

    /// Everybody back to susceptible, pool sizes unchanged.
    pub(crate) fn clear_to_susceptible(&mut self) {
        self.counts.fill(0);
        for (w, &size) in self.sizes.iter().enumerate() {
            self.counts[w * self.stage_count] = size;
        }
    }

    /// Sum of one stage over every ward.
    pub fn stage_total(&self, stage: StageId) -> u64 {
        self.counts
            .iter()
            .skip(stage.index())
            .step_by(self.stage_count)
            .sum()
    }
}

/// Residents of a ward of `population` that belong to `kind`.
pub(crate) fn pool_share(kind: Pool, population: u64, home_fraction: f64) -> u64 {
    let home = ((population as f64) * home_fraction).round() as u64;
    let home = home.min(population);
    match kind {
        Pool::Home => home,
        Pool::Play => population - home,
    }
}

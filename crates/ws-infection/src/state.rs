//! `InfectionState`: both pools plus the ward populations they must add up to.

use std::fmt;

use log::debug;

use ws_core::{DataError, DataResult, ParameterSet, StageId, WardId};
use ws_network::WardNetwork;

use crate::pool::pool_share;
use crate::{ConsistencyError, InfectionPool, Pool};

/// Stage counts for every ward, split into home and play pools.
///
/// # Invariants
///
/// Outside a mutation in progress:
///
/// - `Σ stages(pool, w) == pool_size(pool, w)` for both pools;
/// - `pool_size(Home, w) + pool_size(Play, w) == population(w)`.
///
/// Every mutation goes through [`transfer`](Self::transfer) or
/// [`move_between_pools`](Self::move_between_pools), which refuse to take
/// more people out of a bucket than it holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InfectionState {
    home:        InfectionPool,
    play:        InfectionPool,
    populations: Vec<u64>,
}

impl InfectionState {
    /// Join a home and a play pool built for the same network.
    ///
    /// # Errors
    ///
    /// [`DataError::RowCountMismatch`] when the pools disagree on ward or
    /// stage count, or are passed in the wrong slots.
    pub fn from_pools(home: InfectionPool, play: InfectionPool) -> DataResult<Self> {
        if home.kind() != Pool::Home || play.kind() != Pool::Play {
            return Err(DataError::invalid(
                "pools",
                format!("{}/{}", home.kind(), play.kind()),
                "expected a home pool and a play pool",
            ));
        }
        if home.ward_count() != play.ward_count() {
            return Err(DataError::RowCountMismatch {
                what:     "play pool wards",
                expected: home.ward_count(),
                got:      play.ward_count(),
            });
        }
        if home.stage_count() != play.stage_count() {
            return Err(DataError::RowCountMismatch {
                what:     "play pool stages",
                expected: home.stage_count(),
                got:      play.stage_count(),
            });
        }
        let populations = (0..home.ward_count() as u32)
            .map(WardId)
            .map(|w| home.size(w) + play.size(w))
            .collect();
        Ok(Self { home, play, populations })
    }

    /// Allocate zeroed home and play pools for `network`.
    pub fn initialise(network: &WardNetwork, params: &ParameterSet) -> DataResult<Self> {
        Self::from_pools(
            InfectionPool::initialise_home(network, params),
            InfectionPool::initialise_play(network, params),
        )
    }

    /// Restore the `home_fraction` split and make everybody susceptible.
    ///
    /// The stage layout is taken from `params.disease`, so a state can be
    /// reused for a run with a different disease.
    pub fn reset(&mut self, params: &ParameterSet) -> Result<(), ConsistencyError> {
        let stage_count = params.disease.stage_count();
        let home_sizes = self
            .populations
            .iter()
            .map(|&p| pool_share(Pool::Home, p, params.home_fraction))
            .collect();
        let play_sizes = self
            .populations
            .iter()
            .map(|&p| pool_share(Pool::Play, p, params.home_fraction))
            .collect();
        self.home = InfectionPool::zeroed(Pool::Home, home_sizes, stage_count);
        self.play = InfectionPool::zeroed(Pool::Play, play_sizes, stage_count);
        self.home.clear_to_susceptible();
        self.play.clear_to_susceptible();

        self.check_totals()?;
        debug!(
            "infection state reset: {} wards, {} stages, {} home / {} play",
            self.ward_count(),
            stage_count,
            self.home.stage_total(StageId::SUSCEPTIBLE),
            self.play.stage_total(StageId::SUSCEPTIBLE),
        );
        Ok(())
    }

    // ── Read access ───────────────────────────────────────────────────────

    #[inline]
    pub fn ward_count(&self) -> usize {
        self.populations.len()
    }

    #[inline]
    pub fn stage_count(&self) -> usize {
        self.home.stage_count()
    }

    #[inline]
    pub fn pool(&self, pool: Pool) -> &InfectionPool {
        match pool {
            Pool::Home => &self.home,
            Pool::Play => &self.play,
        }
    }

    #[inline]
    fn pool_mut(&mut self, pool: Pool) -> &mut InfectionPool {
        match pool {
            Pool::Home => &mut self.home,
            Pool::Play => &mut self.play,
        }
    }

    #[inline]
    pub fn count(&self, pool: Pool, ward: WardId, stage: StageId) -> u64 {
        self.pool(pool).count(ward, stage)
    }

    #[inline]
    pub fn stages(&self, pool: Pool, ward: WardId) -> &[u64] {
        self.pool(pool).stages(ward)
    }

    #[inline]
    pub fn susceptible(&self, pool: Pool, ward: WardId) -> u64 {
        self.count(pool, ward, StageId::SUSCEPTIBLE)
    }

    #[inline]
    pub fn pool_size(&self, pool: Pool, ward: WardId) -> u64 {
        self.pool(pool).size(ward)
    }

    /// Residents of `ward`, fixed for the life of the state.
    #[inline]
    pub fn population(&self, ward: WardId) -> u64 {
        self.populations[ward.index()]
    }

    pub fn total_population(&self) -> u64 {
        self.populations.iter().sum()
    }

    /// Everybody counted in `ward` across both pools and all stages.
    pub fn ward_total(&self, ward: WardId) -> u64 {
        self.stages(Pool::Home, ward).iter().sum::<u64>()
            + self.stages(Pool::Play, ward).iter().sum::<u64>()
    }

    pub fn stage_total(&self, stage: StageId) -> u64 {
        self.home.stage_total(stage) + self.play.stage_total(stage)
    }

    /// Per-stage totals over both pools and every ward.
    pub fn stage_totals(&self) -> Vec<u64> {
        (0..self.stage_count() as u8)
            .map(StageId)
            .map(|s| self.stage_total(s))
            .collect()
    }

    /// People in a disease stage other than the last (removed) one.
    pub fn infected_total(&self) -> u64 {
        let removed = self.stage_count().saturating_sub(1);
        (1..removed as u8).map(StageId).map(|s| self.stage_total(s)).sum()
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Move `n` people of `ward` in `pool` from one stage to another.
    pub fn transfer(
        &mut self,
        pool:       Pool,
        ward:       WardId,
        from_stage: StageId,
        to_stage:   StageId,
        n:          u64,
    ) -> Result<(), ConsistencyError> {
        if n == 0 || from_stage == to_stage {
            return Ok(());
        }
        let stages = self.pool_mut(pool).stages_mut(ward);
        let available = stages[from_stage.index()];
        if available < n {
            return Err(ConsistencyError::Underflow {
                ward,
                pool,
                stage: from_stage,
                requested: n,
                available,
            });
        }
        stages[from_stage.index()] -= n;
        stages[to_stage.index()] += n;
        Ok(())
    }

    /// Move `n` people of `ward` in `stage` from one pool to the other.
    pub fn move_between_pools(
        &mut self,
        from:  Pool,
        ward:  WardId,
        stage: StageId,
        n:     u64,
    ) -> Result<(), ConsistencyError> {
        if n == 0 {
            return Ok(());
        }
        let source = self.pool_mut(from);
        let available = source.stages(ward)[stage.index()];
        if available < n {
            return Err(ConsistencyError::Underflow {
                ward,
                pool: from,
                stage,
                requested: n,
                available,
            });
        }
        source.stages_mut(ward)[stage.index()] -= n;
        *source.size_mut(ward) -= n;

        let target = self.pool_mut(from.other());
        target.stages_mut(ward)[stage.index()] += n;
        *target.size_mut(ward) += n;
        Ok(())
    }

    // ── Checks ────────────────────────────────────────────────────────────

    /// Verify both conservation invariants against `network`'s populations.
    pub fn check_conservation(&self, network: &WardNetwork) -> Result<(), ConsistencyError> {
        if network.ward_count() != self.ward_count() {
            return Err(ConsistencyError::WardCount {
                state:   self.ward_count(),
                network: network.ward_count(),
            });
        }
        for ward in network.ward_ids() {
            if self.populations[ward.index()] != network.population(ward) {
                return Err(ConsistencyError::Population {
                    ward,
                    present:    self.populations[ward.index()],
                    population: network.population(ward),
                });
            }
        }
        self.check_totals()
    }

    /// Verify the invariants against the populations recorded at creation.
    pub fn check_totals(&self) -> Result<(), ConsistencyError> {
        for w in 0..self.ward_count() as u32 {
            let ward = WardId(w);
            for pool in Pool::ALL {
                let counted: u64 = self.stages(pool, ward).iter().sum();
                let size = self.pool_size(pool, ward);
                if counted != size {
                    return Err(ConsistencyError::PoolSize { ward, pool, counted, size });
                }
            }
            let present = self.pool_size(Pool::Home, ward) + self.pool_size(Pool::Play, ward);
            let population = self.population(ward);
            if present != population {
                return Err(ConsistencyError::Population { ward, present, population });
            }
        }
        Ok(())
    }

    /// Full copy of every count, for error reports.
    pub fn dump(&self) -> StateDump {
        let wards = (0..self.ward_count() as u32)
            .map(WardId)
            .map(|ward| WardDump {
                ward,
                population: self.population(ward),
                home:       self.stages(Pool::Home, ward).to_vec(),
                play:       self.stages(Pool::Play, ward).to_vec(),
            })
            .collect();
        StateDump { stage_count: self.stage_count(), wards }
    }
}

// ── StateDump ─────────────────────────────────────────────────────────────────

/// Snapshot of an [`InfectionState`] attached to consistency failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateDump {
    pub stage_count: usize,
    pub wards:       Vec<WardDump>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WardDump {
    pub ward:       WardId,
    pub population: u64,
    pub home:       Vec<u64>,
    pub play:       Vec<u64>,
}

impl fmt::Display for StateDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ward,population,pool,stages")?;
        for w in &self.wards {
            writeln!(f, "{},{},home,{:?}", w.ward.0, w.population, w.home)?;
            writeln!(f, "{},{},play,{:?}", w.ward.0, w.population, w.play)?;
        }
        Ok(())
    }
}

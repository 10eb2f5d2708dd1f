//! Home/play pool rebalancing.

use log::{debug, trace};

use ws_core::{MovementRounding, ParameterSet, RandomStream, Sampler, StageId, WardId};
use ws_infection::{ConsistencyError, InfectionState, Pool};

/// People moved by one rebalancing step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MovementReport {
    pub play_to_home: u64,
    pub home_to_play: u64,
}

impl MovementReport {
    /// Change in the total home pool size.
    pub fn net_to_home(&self) -> i64 {
        self.play_to_home as i64 - self.home_to_play as i64
    }
}

/// Moves people between pools according to `play_to_work`, `work_to_play`
/// and the rounding policy.
#[derive(Copy, Clone, Debug)]
pub struct MovementEngine {
    play_to_work: f64,
    work_to_play: f64,
    rounding:     MovementRounding,
}

impl MovementEngine {
    pub fn new(params: &ParameterSet) -> Self {
        Self {
            play_to_work: params.play_to_work,
            work_to_play: params.work_to_play,
            rounding:     params.movement_rounding,
        }
    }

    /// `true` when a rebalance cannot move anybody.
    pub fn is_noop(&self) -> bool {
        self.play_to_work == 0.0 && self.work_to_play == 0.0
    }

    /// Rebalance every ward of `state`.
    ///
    /// For each ward (ascending) and stage (ascending), `play_to_work` of the
    /// play bucket moves to home and `work_to_play` of the home bucket moves
    /// to play.  Both amounts come from the counts before the step.  Under
    /// [`MovementRounding::Stochastic`] the play→home draw precedes the
    /// home→play draw, and a draw only happens when the amount has a
    /// fractional part.
    pub fn rebalance(
        &self,
        state: &mut InfectionState,
        rng:   &mut RandomStream,
    ) -> Result<MovementReport, ConsistencyError> {
        let mut report = MovementReport::default();
        if self.is_noop() {
            return Ok(report);
        }

        for w in 0..state.ward_count() as u32 {
            let ward = WardId(w);
            for s in 0..state.stage_count() as u8 {
                let stage = StageId(s);
                let home = state.count(Pool::Home, ward, stage);
                let play = state.count(Pool::Play, ward, stage);

                let to_home = self.round(self.play_to_work * play as f64, rng).min(play);
                let to_play = self.round(self.work_to_play * home as f64, rng).min(home);

                state.move_between_pools(Pool::Play, ward, stage, to_home)?;
                state.move_between_pools(Pool::Home, ward, stage, to_play)?;
                report.play_to_home += to_home;
                report.home_to_play += to_play;
            }
            trace!(
                "{ward}: home {} / play {} after rebalance",
                state.pool_size(Pool::Home, ward),
                state.pool_size(Pool::Play, ward)
            );
        }

        debug!(
            "moved {} play→home and {} home→play ({:?} rounding)",
            report.play_to_home, report.home_to_play, self.rounding
        );
        Ok(report)
    }

    fn round(&self, x: f64, rng: &mut RandomStream) -> u64 {
        let whole = x.floor();
        let frac = x - whole;
        let extra = match self.rounding {
            MovementRounding::Deterministic => 0,
            MovementRounding::Stochastic => u64::from(frac > 0.0 && rng.bernoulli(frac)),
        };
        whole as u64 + extra
    }
}

/// Rebalance `state` once with the movement settings of `params`.
pub fn move_population(
    state:  &mut InfectionState,
    params: &ParameterSet,
    rng:    &mut RandomStream,
) -> Result<MovementReport, ConsistencyError> {
    MovementEngine::new(params).rebalance(state, rng)
}

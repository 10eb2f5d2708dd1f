//! Unit tests for ws-movement.

#[cfg(test)]
mod helpers {
    use ws_core::{ParameterSet, Parameters};
    use ws_infection::{InfectionState, Pool};
    use ws_network::{WardNetwork, WardNetworkBuilder};

    /// Wards 0..3 of 1000 each.  Play: 0→0 (1), 0→1 (3); 1→2 (0);
    /// ward 2 has no play links.
    pub fn network() -> WardNetwork {
        let mut b = WardNetworkBuilder::new();
        let w: Vec<_> = (0..3).map(|_| b.add_ward(1_000, None)).collect();
        b.add_play_link(w[0], w[0], 1.0);
        b.add_play_link(w[0], w[1], 3.0);
        b.add_play_link(w[1], w[2], 0.0);
        b.build().unwrap()
    }

    pub fn state(net: &WardNetwork, params: &ParameterSet) -> InfectionState {
        let mut s = InfectionState::initialise(net, params).unwrap();
        s.reset(params).unwrap();
        s
    }

    pub fn params(f: impl FnOnce(&mut Parameters)) -> ParameterSet {
        let mut p = Parameters::default();
        f(&mut p);
        p.finalize().unwrap()
    }

    pub fn home_total(state: &InfectionState) -> u64 {
        (0..state.ward_count() as u32)
            .map(|w| state.pool_size(Pool::Home, ws_core::WardId(w)))
            .sum()
    }
}

// ── Play matrix ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod play {
    use approx::assert_relative_eq;

    use ws_core::WardId;

    use crate::rescale_play_matrix;

    #[test]
    fn shares_follow_weights() {
        let net = super::helpers::network();
        let m = rescale_play_matrix(&net, &super::helpers::params(|_| {}));
        assert_eq!(m.ward_count(), 3);

        let d = m.destinations(WardId(0));
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].to, WardId(0));
        assert_relative_eq!(d[0].fraction, 0.25);
        assert_eq!(d[1].to, WardId(1));
        assert_relative_eq!(d[1].fraction, 0.75);
    }

    #[test]
    fn static_share_forces_home() {
        let net = super::helpers::network();
        let m = rescale_play_matrix(&net, &super::helpers::params(|p| p.static_play_at_home = 0.6));

        // 0.6 + 0.4 × 1/4 = 0.7 ; 0.4 × 3/4 = 0.3
        assert_relative_eq!(m.self_fraction(WardId(0)), 0.7);
        assert_relative_eq!(m.destinations(WardId(0))[1].fraction, 0.3);
        let sum: f64 = m.destinations(WardId(0)).iter().map(|s| s.fraction).sum();
        assert_relative_eq!(sum, 1.0);
    }

    #[test]
    fn zero_weight_stays_home() {
        let net = super::helpers::network();
        let m = rescale_play_matrix(&net, &super::helpers::params(|_| {}));
        for w in [WardId(1), WardId(2)] {
            let d = m.destinations(w);
            assert_eq!(d.len(), 1);
            assert_eq!(d[0].to, w);
            assert_relative_eq!(d[0].fraction, 1.0);
        }
    }

    #[test]
    fn network_is_not_modified() {
        let net = super::helpers::network();
        let before: Vec<f64> = net.play.links.iter().map(|l| l.weight).collect();
        let _ = rescale_play_matrix(&net, &super::helpers::params(|p| p.static_play_at_home = 1.0));
        let after: Vec<f64> = net.play.links.iter().map(|l| l.weight).collect();
        assert_eq!(before, after);
    }
}

// ── Pool rebalancing ──────────────────────────────────────────────────────────

#[cfg(test)]
mod rebalance {
    use ws_core::{MovementRounding, RandomStream, StageId, WardId};
    use ws_infection::Pool;

    use crate::{move_population, MovementEngine, MovementReport};

    #[test]
    fn zero_fractions_are_a_noop() {
        let net = super::helpers::network();
        let params = super::helpers::params(|_| {});
        let mut state = super::helpers::state(&net, &params);
        let before = state.clone();

        let mut rng = RandomStream::new(1);
        let mut untouched = RandomStream::new(1);
        let report = move_population(&mut state, &params, &mut rng).unwrap();

        assert_eq!(report, MovementReport::default());
        assert_eq!(state, before);
        assert_eq!(rng.next_seed(), untouched.next_seed());
        assert!(MovementEngine::new(&params).is_noop());
    }

    #[test]
    fn deterministic_floors_and_draws_nothing() {
        let net = super::helpers::network();
        let params = super::helpers::params(|p| {
            p.play_to_work = 0.333;
            p.work_to_play = 0.1;
            p.movement_rounding = MovementRounding::Deterministic;
        });
        let mut state = super::helpers::state(&net, &params);
        let mut rng = RandomStream::new(1);
        let mut untouched = RandomStream::new(1);

        let report = move_population(&mut state, &params, &mut rng).unwrap();
        // floor(0.333 × 500) = 166, floor(0.1 × 500) = 50, per ward.
        assert_eq!(report.play_to_home, 3 * 166);
        assert_eq!(report.home_to_play, 3 * 50);
        assert_eq!(state.pool_size(Pool::Home, WardId(0)), 500 + 166 - 50);
        assert_eq!(report.net_to_home(), 3 * 116);
        assert_eq!(rng.next_seed(), untouched.next_seed());
        assert!(state.check_conservation(&net).is_ok());
    }

    #[test]
    fn stochastic_rounds_within_one() {
        let net = super::helpers::network();
        let params = super::helpers::params(|p| {
            p.play_to_work = 0.333;
            p.movement_rounding = MovementRounding::Stochastic;
        });
        let mut state = super::helpers::state(&net, &params);
        let mut rng = RandomStream::new(7);

        let report = move_population(&mut state, &params, &mut rng).unwrap();
        assert!((3 * 166..=3 * 167).contains(&report.play_to_home));
        assert_eq!(report.home_to_play, 0);
        assert_eq!(super::helpers::home_total(&state), 1_500 + report.play_to_home);
        assert!(state.check_conservation(&net).is_ok());
    }

    #[test]
    fn whole_amounts_draw_nothing() {
        let net = super::helpers::network();
        let params = super::helpers::params(|p| p.work_to_play = 0.5);
        let mut state = super::helpers::state(&net, &params);
        let mut rng = RandomStream::new(3);
        let mut untouched = RandomStream::new(3);

        move_population(&mut state, &params, &mut rng).unwrap();
        assert_eq!(rng.next_seed(), untouched.next_seed(), "250 is whole; no Bernoulli draw");
    }

    #[test]
    fn moves_every_stage() {
        let net = super::helpers::network();
        let params = super::helpers::params(|p| {
            p.play_to_work = 1.0;
            p.movement_rounding = MovementRounding::Deterministic;
        });
        let mut state = super::helpers::state(&net, &params);
        state.transfer(Pool::Play, WardId(1), StageId(0), StageId(2), 20).unwrap();

        move_population(&mut state, &params, &mut rng()).unwrap();
        assert_eq!(state.pool_size(Pool::Play, WardId(1)), 0);
        assert_eq!(state.count(Pool::Home, WardId(1), StageId(2)), 20);
        assert_eq!(state.ward_total(WardId(1)), 1_000);
        assert!(state.check_conservation(&net).is_ok());
    }

    #[test]
    fn same_seed_same_result() {
        let net = super::helpers::network();
        let params = super::helpers::params(|p| {
            p.play_to_work = 0.123;
            p.work_to_play = 0.456;
        });
        let run = || {
            let mut state = super::helpers::state(&net, &params);
            move_population(&mut state, &params, &mut RandomStream::new(99)).unwrap();
            state
        };
        assert_eq!(run(), run());
    }

    fn rng() -> RandomStream {
        RandomStream::new(0)
    }
}

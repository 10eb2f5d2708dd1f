//! Force of infection and the per-ward daily draws.
//!
//! # Exposure model
//!
//! By day, each pool leaves its home ward along its routes (home pool:
//! work fractions; play pool: the rescaled play matrix), except the
//! `too_ill_to_move` share of each infected stage, which stays put.  By
//! night everybody is at home.  For a susceptible of ward `u` in pool `P`:
//!
//! ```text
//! λ = length_day × Σ_v f_P(u, v) × day_density(v)
//!   + (1 − length_day) × night_density(u)
//! p = 1 − exp(−λ)
//! ```
//!
//! where a density is the summed `beta × uv` of the infected present
//! divided by everybody present.  Routes longer than `dyn_dist_cutoff` are
//! folded into the home ward's share.

use ws_core::{Disease, ParameterSet, Sampler, StageId, StageParams, WardId, WardStream};
use ws_infection::{InfectionState, Pool};
use ws_movement::PlayMatrix;
use ws_network::WardNetwork;

// ── Routes ────────────────────────────────────────────────────────────────────

/// Daytime destinations of one pool, CSR by ward.  Each ward's first entry
/// is itself; fractions sum to 1.
#[derive(Clone, Debug)]
pub(crate) struct Routes {
    out_start: Vec<u32>,
    dest:      Vec<(WardId, f64)>,
}

impl Routes {
    #[inline]
    fn of(&self, ward: WardId) -> &[(WardId, f64)] {
        let start = self.out_start[ward.index()] as usize;
        let end   = self.out_start[ward.index() + 1] as usize;
        &self.dest[start..end]
    }

    /// Build from `(to, fraction, distance)` triples per ward.
    fn build<I>(network: &WardNetwork, cutoff: f64, mut links_of: impl FnMut(WardId) -> I) -> Self
    where
        I: Iterator<Item = (WardId, f64, f64)>,
    {
        let mut out_start = Vec::with_capacity(network.ward_count() + 1);
        let mut dest = Vec::new();
        out_start.push(0);
        for ward in network.ward_ids() {
            let self_index = dest.len();
            dest.push((ward, 1.0));
            for (to, fraction, distance) in links_of(ward) {
                if to == ward || distance > cutoff || fraction <= 0.0 {
                    continue;
                }
                dest[self_index].1 -= fraction;
                dest.push((to, fraction));
            }
            // Guard against float drift below zero.
            dest[self_index].1 = dest[self_index].1.max(0.0);
            out_start.push(dest.len() as u32);
        }
        Self { out_start, dest }
    }

    pub(crate) fn work(network: &WardNetwork, cutoff: f64) -> Self {
        Self::build(network, cutoff, move |w| {
            network.work_links(w).iter().map(|l| (l.to, l.fraction, l.distance))
        })
    }

    pub(crate) fn play(network: &WardNetwork, matrix: &PlayMatrix, cutoff: f64) -> Self {
        Self::build(network, cutoff, move |w| {
            matrix.destinations(w).iter().map(|s| (s.to, s.fraction, s.distance))
        })
    }
}

// ── Transmission ──────────────────────────────────────────────────────────────

/// Draws for one ward on one day.
#[derive(Clone, Debug, Default)]
pub(crate) struct WardOutcome {
    /// New infections, indexed home then play.
    pub infections:   [u64; 2],
    /// People leaving each stage, indexed by pool then stage.
    pub progressions: [Vec<u64>; 2],
}

/// Per-stage rates and routes, fixed for a run.
#[derive(Clone, Debug)]
pub(crate) struct Transmission {
    home:        Routes,
    play:        Routes,
    /// `beta × uv` per stage; 0 for susceptible.
    infectivity: Vec<f64>,
    too_ill:     Vec<f64>,
    progress:    Vec<f64>,
    length_day:  f64,
}

impl Transmission {
    pub(crate) fn new(network: &WardNetwork, matrix: &PlayMatrix, params: &ParameterSet) -> Self {
        let disease = &params.disease;
        Self {
            home:        Routes::work(network, params.dyn_dist_cutoff),
            play:        Routes::play(network, matrix, params.dyn_dist_cutoff),
            infectivity: per_stage(disease, |p| p.beta * params.uv),
            too_ill:     per_stage(disease, |p| p.too_ill_to_move),
            progress:    per_stage(disease, |p| p.progress),
            length_day:  params.length_day,
        }
    }

    #[inline]
    fn routes(&self, pool: Pool) -> &Routes {
        match pool {
            Pool::Home => &self.home,
            Pool::Play => &self.play,
        }
    }

    /// Infection probability per ward for `(home, play)` susceptibles.
    /// Reads only `dawn`; consumes no randomness.
    pub(crate) fn infection_probabilities(&self, dawn: &InfectionState) -> Vec<[f64; 2]> {
        let n = dawn.ward_count();
        let mut day_infectious   = vec![0.0f64; n];
        let mut day_present      = vec![0.0f64; n];
        let mut night_infectious = vec![0.0f64; n];

        for w in 0..n as u32 {
            let ward = WardId(w);
            for pool in Pool::ALL {
                let routes = self.routes(pool).of(ward);
                for (s, &count) in dawn.stages(pool, ward).iter().enumerate() {
                    if count == 0 {
                        continue;
                    }
                    let c = count as f64;
                    let stay = self.too_ill[s] * c;
                    let mobile = c - stay;
                    let beta = self.infectivity[s];

                    day_present[ward.index()] += stay;
                    day_infectious[ward.index()] += stay * beta;
                    night_infectious[ward.index()] += c * beta;
                    for &(to, f) in routes {
                        day_present[to.index()] += mobile * f;
                        day_infectious[to.index()] += mobile * f * beta;
                    }
                }
            }
        }

        let day_density: Vec<f64> = day_infectious
            .iter()
            .zip(&day_present)
            .map(|(&i, &p)| if p > 0.0 { i / p } else { 0.0 })
            .collect();

        (0..n as u32)
            .map(WardId)
            .map(|ward| {
                let population = dawn.population(ward) as f64;
                let night = if population > 0.0 {
                    night_infectious[ward.index()] / population
                } else {
                    0.0
                };
                Pool::ALL.map(|pool| {
                    let day: f64 = self
                        .routes(pool)
                        .of(ward)
                        .iter()
                        .map(|&(to, f)| f * day_density[to.index()])
                        .sum();
                    let lambda = self.length_day * day + (1.0 - self.length_day) * night;
                    (1.0 - (-lambda).exp()).clamp(0.0, 1.0)
                })
            })
            .collect()
    }

    /// Draw new infections and progressions for `ward`.
    ///
    /// Infections come from the current susceptibles, progressions from the
    /// dawn counts, so nobody who arrived in a stage today leaves it today.
    pub(crate) fn ward_outcome(
        &self,
        ward:     WardId,
        dawn:     &InfectionState,
        current:  &InfectionState,
        p:        [f64; 2],
        day_seed: u64,
    ) -> WardOutcome {
        let mut rng = WardStream::new(day_seed, ward);
        let mut infections = [0u64; 2];
        for (i, pool) in Pool::ALL.into_iter().enumerate() {
            infections[i] = rng.binomial(current.count(pool, ward, StageId::SUSCEPTIBLE), p[i]);
        }
        let progressions = Pool::ALL.map(|pool| {
            dawn.stages(pool, ward)
                .iter()
                .zip(&self.progress)
                .map(|(&count, &q)| rng.binomial(count, q))
                .collect::<Vec<u64>>()
        });
        WardOutcome { infections, progressions }
    }
}

/// One value per stage, susceptible included (as 0).
fn per_stage(disease: &Disease, f: impl Fn(&StageParams) -> f64) -> Vec<f64> {
    disease
        .stage_ids()
        .map(|s| disease.params(s).map_or(0.0, &f))
        .collect()
}

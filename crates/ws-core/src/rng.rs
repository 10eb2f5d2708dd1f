//! Deterministic random streams.
//!
//! # Determinism strategy
//!
//! A run owns exactly one [`RandomStream`], created from the run seed and
//! passed by `&mut` to every stochastic step.  Nothing reads ambient RNG
//! state.
//!
//! Work that can run in parallel (per-ward transmission and progression)
//! never touches the master stream.  Instead the loop draws one `u64` day
//! seed from it and every ward derives its own [`WardStream`]:
//!
//!   seed = day_seed XOR (ward_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive ward IDs uniformly across the seed space.  A
//! ward's draws therefore depend only on the day seed and its own ID, never
//! on which thread ran it or in what order.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Binomial, Distribution, Exp, Poisson};

use crate::WardId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── Sampler ───────────────────────────────────────────────────────────────────

/// The draws the engine needs, shared by both stream types.
///
/// Degenerate arguments (`n == 0`, `p` at or outside `[0, 1]`, a zero mean)
/// return the exact answer without consuming any randomness, so turning a
/// feature off never shifts the rest of the stream.
pub trait Sampler {
    /// Expose the underlying generator for use with `rand` distributions.
    fn inner(&mut self) -> &mut SmallRng;

    /// Uniform draw in `[0, 1)`.
    #[inline]
    fn uniform(&mut self) -> f64 {
        self.inner().r#gen()
    }

    /// `true` with probability `p`.
    #[inline]
    fn bernoulli(&mut self, p: f64) -> bool {
        if p.is_nan() || p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.inner().gen_bool(p)
    }

    /// Number of successes in `n` trials of probability `p`.
    fn binomial(&mut self, n: u64, p: f64) -> u64 {
        if n == 0 || p.is_nan() || p <= 0.0 {
            return 0;
        }
        if p >= 1.0 {
            return n;
        }
        match Binomial::new(n, p) {
            Ok(dist) => dist.sample(self.inner()),
            Err(_) => 0,
        }
    }

    /// Poisson-distributed count with the given mean.
    fn poisson(&mut self, mean: f64) -> u64 {
        if !mean.is_finite() || mean <= 0.0 {
            return 0;
        }
        match Poisson::new(mean) {
            Ok(dist) => {
                let x: f64 = dist.sample(self.inner());
                x as u64
            }
            Err(_) => 0,
        }
    }

    /// Exponentially distributed waiting time with the given rate.
    ///
    /// A non-positive rate means the event never happens: `f64::INFINITY`.
    fn exponential(&mut self, rate: f64) -> f64 {
        if rate.is_nan() || rate <= 0.0 {
            return f64::INFINITY;
        }
        match Exp::new(rate) {
            Ok(dist) => dist.sample(self.inner()),
            Err(_) => f64::INFINITY,
        }
    }
}

// ── RandomStream ──────────────────────────────────────────────────────────────

/// The run's master stream.
///
/// Consumed only from sequential code, in the order documented by the
/// simulation loop.  For parallel work hand out [`WardStream`]s seeded from
/// [`next_seed`](Self::next_seed) instead.
pub struct RandomStream(SmallRng);

impl RandomStream {
    pub fn new(seed: u64) -> Self {
        RandomStream(SmallRng::seed_from_u64(seed))
    }

    /// Draw a raw `u64`, typically used to seed a batch of ward streams.
    #[inline]
    pub fn next_seed(&mut self) -> u64 {
        self.0.r#gen()
    }

    /// Derive a child stream with a different seed offset, e.g. for
    /// replicate runs that share one root seed.
    pub fn child(&mut self, offset: u64) -> RandomStream {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        RandomStream(SmallRng::seed_from_u64(child_seed))
    }
}

impl Sampler for RandomStream {
    #[inline]
    fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }
}

// ── WardStream ────────────────────────────────────────────────────────────────

/// Per-ward, per-day stream.
///
/// Create one per ward for each day from the day seed.  Each rayon task
/// builds its own, so streams are never shared between threads.
pub struct WardStream(SmallRng);

impl WardStream {
    pub fn new(day_seed: u64, ward: WardId) -> Self {
        let seed = day_seed ^ (ward.0 as u64).wrapping_mul(MIXING_CONSTANT);
        WardStream(SmallRng::seed_from_u64(seed))
    }
}

impl Sampler for WardStream {
    #[inline]
    fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }
}

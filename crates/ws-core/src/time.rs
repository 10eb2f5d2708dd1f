//! Simulation time model.
//!
//! Time advances in whole days.  `Day(0)` is the first simulated day; seed
//! records and output rows refer to days by this index.

use std::fmt;

// ── Day ───────────────────────────────────────────────────────────────────────

/// An absolute simulated day counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Day(pub u32);

impl Day {
    pub const ZERO: Day = Day(0);

    /// Return the day `n` days after `self`.
    #[inline]
    pub fn offset(self, n: u32) -> Day {
        Day(self.0 + n)
    }

    /// Days elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Day) -> u32 {
        self.0 - earlier.0
    }

    #[inline]
    pub fn next(self) -> Day {
        Day(self.0 + 1)
    }
}

impl std::ops::Add<u32> for Day {
    type Output = Day;
    #[inline]
    fn add(self, rhs: u32) -> Day {
        Day(self.0 + rhs)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {}", self.0)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Run-level settings that are not part of the epidemiological parameters.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Hard upper bound on the number of simulated days.
    pub max_days: u32,
    /// Worker thread count for the `parallel` feature.  `None` uses rayon's
    /// global pool.
    pub num_threads: Option<usize>,
    /// Emit a per-ward snapshot every N days.  0 disables snapshots.
    pub snapshot_interval_days: u32,
}

impl SimConfig {
    /// The day at which the simulation stops (exclusive upper bound).
    #[inline]
    pub fn end_day(&self) -> Day {
        Day(self.max_days)
    }

    /// `true` if a ward snapshot is due at the end of `day`.
    #[inline]
    pub fn snapshot_due(&self, day: Day) -> bool {
        self.snapshot_interval_days > 0 && day.0.is_multiple_of(self.snapshot_interval_days)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_days:               730,
            num_threads:            None,
            snapshot_interval_days: 0,
        }
    }
}

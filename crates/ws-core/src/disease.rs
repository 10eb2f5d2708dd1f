//! Disease progression model.
//!
//! A disease is an ordered list of stages.  Stage 0 (susceptible) is implicit
//! and never listed; `Disease::stages[i]` describes stage `i + 1`.  Each day
//! an individual in stage `s` moves to `s + 1` with probability
//! `progress`.  The last stage is "removed" and must not progress.

use crate::{DataError, DataResult, StageId};

/// Per-stage epidemiological parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StageParams {
    pub name: String,
    /// Infectiousness contributed to the force of infection per individual.
    pub beta: f64,
    /// Daily probability of advancing to the next stage.
    pub progress: f64,
    /// Share of this stage that stays in its home ward during the day.
    pub too_ill_to_move: f64,
}

impl StageParams {
    pub fn new(name: &str, beta: f64, progress: f64, too_ill_to_move: f64) -> Self {
        Self { name: name.to_owned(), beta, progress, too_ill_to_move }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Disease {
    /// Disease stages `1..=n`, in progression order.
    pub stages: Vec<StageParams>,
    /// Stage receiving seeded and imported infections.
    pub seed_stage: StageId,
}

impl Disease {
    /// Names accepted by [`Disease::preset`].
    pub const PRESETS: &'static [&'static str] = &["ncov"];

    /// Look a preset up by name, ignoring case.
    pub fn preset(name: &str) -> DataResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ncov" => Ok(Self::ncov()),
            _ => Err(DataError::Disease(format!(
                "unknown disease {name:?} (known: {})",
                Self::PRESETS.join(", ")
            ))),
        }
    }

    /// Four-stage preset: exposed, infectious, symptomatic, removed.
    pub fn ncov() -> Self {
        Self {
            stages: vec![
                StageParams::new("exposed",     0.00, 0.1923, 0.0),
                StageParams::new("infectious",  0.95, 0.5,    0.0),
                StageParams::new("symptomatic", 0.50, 0.2,    0.8),
                StageParams::new("removed",     0.00, 0.0,    1.0),
            ],
            seed_stage: StageId::FIRST_INFECTED,
        }
    }

    /// Susceptible plus disease stages.
    #[inline]
    pub fn stage_count(&self) -> usize {
        self.stages.len() + 1
    }

    /// The terminal (removed) stage.
    #[inline]
    pub fn removed_stage(&self) -> StageId {
        StageId(self.stages.len() as u8)
    }

    /// Parameters for a disease stage.  `None` for the susceptible stage or
    /// an out-of-range id.
    pub fn params(&self, stage: StageId) -> Option<&StageParams> {
        stage.index().checked_sub(1).and_then(|i| self.stages.get(i))
    }

    /// `true` for stages that still carry an active infection.
    #[inline]
    pub fn is_infected(&self, stage: StageId) -> bool {
        stage.0 >= 1 && stage < self.removed_stage()
    }

    /// Human-readable stage label.
    pub fn stage_name(&self, stage: StageId) -> &str {
        if stage == StageId::SUSCEPTIBLE {
            return "susceptible";
        }
        self.params(stage).map_or("unknown", |p| p.name.as_str())
    }

    /// Iterator over every stage id, susceptible first.
    pub fn stage_ids(&self) -> impl Iterator<Item = StageId> {
        (0..self.stage_count() as u8).map(StageId)
    }

    /// Check probabilities and stage layout.
    pub fn validate(&self) -> DataResult<()> {
        if self.stages.len() < 2 {
            return Err(DataError::Disease(
                "need at least one infected stage and a removed stage".into(),
            ));
        }
        if self.stages.len() >= u8::MAX as usize {
            return Err(DataError::Disease(format!("too many stages ({})", self.stages.len())));
        }
        for (i, s) in self.stages.iter().enumerate() {
            let stage = i + 1;
            if !s.beta.is_finite() || s.beta < 0.0 {
                return Err(DataError::Disease(format!("stage {stage} beta {} is not a rate", s.beta)));
            }
            if !(0.0..=1.0).contains(&s.progress) {
                return Err(DataError::Disease(format!(
                    "stage {stage} progress {} outside [0, 1]",
                    s.progress
                )));
            }
            if !(0.0..=1.0).contains(&s.too_ill_to_move) {
                return Err(DataError::Disease(format!(
                    "stage {stage} too_ill_to_move {} outside [0, 1]",
                    s.too_ill_to_move
                )));
            }
        }
        let removed = &self.stages[self.stages.len() - 1];
        if removed.progress != 0.0 {
            return Err(DataError::Disease(format!(
                "removed stage {:?} must not progress",
                removed.name
            )));
        }
        if self.seed_stage == StageId::SUSCEPTIBLE || self.seed_stage >= self.removed_stage() {
            return Err(DataError::Disease(format!(
                "seed stage {} must be an infected stage",
                self.seed_stage
            )));
        }
        Ok(())
    }
}

impl Default for Disease {
    fn default() -> Self {
        Self::ncov()
    }
}

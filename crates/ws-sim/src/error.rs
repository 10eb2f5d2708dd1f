use thiserror::Error;

use ws_core::{DataError, Day};
use ws_infection::{ConsistencyError, InfectionState, SeedError, StateDump};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("input data error: {0}")]
    Data(#[from] DataError),

    #[error("seeding failed: {0}")]
    Seed(#[from] SeedError),

    #[error("{day}: infection state inconsistent: {source}")]
    Consistency {
        day:    Day,
        source: ConsistencyError,
        dump:   Box<StateDump>,
    },
}

impl SimError {
    /// Wrap `source` with a full dump of `state`.
    pub fn consistency(day: Day, source: ConsistencyError, state: &InfectionState) -> Self {
        SimError::Consistency { day, source, dump: Box::new(state.dump()) }
    }
}

pub type SimResult<T> = Result<T, SimError>;

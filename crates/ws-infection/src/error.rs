use thiserror::Error;

use ws_core::{Day, StageId, WardId};

use crate::Pool;

/// The infection state no longer adds up.
///
/// Always a bug or corrupted input; the simulation stops at the day
/// boundary where it is detected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("{ward}: {pool} pool stages sum to {counted} but the pool holds {size}")]
    PoolSize {
        ward:    WardId,
        pool:    Pool,
        counted: u64,
        size:    u64,
    },

    #[error("{ward}: home + play = {present} but population is {population}")]
    Population {
        ward:       WardId,
        present:    u64,
        population: u64,
    },

    #[error("{ward} {pool} pool: cannot take {requested} from stage {stage}, only {available} there")]
    Underflow {
        ward:      WardId,
        pool:      Pool,
        stage:     StageId,
        requested: u64,
        available: u64,
    },

    #[error("state has {state} wards but the network has {network}")]
    WardCount { state: usize, network: usize },
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("seed record {index} references unknown ward {ward} (network has {ward_count} wards)")]
    OutOfRange {
        index:      usize,
        ward:       WardId,
        ward_count: usize,
    },

    #[error("{day}: seeding {requested} into {ward} exceeds its {available} susceptibles")]
    ExceedsSusceptible {
        day:       Day,
        ward:      WardId,
        requested: u64,
        available: u64,
    },

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),
}

pub type SeedResult<T> = Result<T, SeedError>;

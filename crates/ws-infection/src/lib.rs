//! `ws-infection`: who is in which disease stage, where.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                    |
//! |-----------|-------------------------------------------------------------|
//! | [`pool`]  | `Pool` (home / play), `InfectionPool` stage buckets         |
//! | [`state`] | `InfectionState`, `StateDump`                               |
//! | [`seeds`] | `SeedRecord`, `SeedSchedule`, `ImportSeeder`, seed file reader |
//! | [`error`] | `ConsistencyError`, `SeedError`                             |
//!
//! # Lifecycle
//!
//! ```rust,ignore
//! let mut state = InfectionState::initialise(&network, &params)?; // zeroed
//! state.reset(&params)?;                                          // all susceptible
//! // ... movement rebalancing, then the day loop ...
//! ```
//!
//! Counts are `u64` and every mutation is checked, so a bucket can never go
//! negative.  [`InfectionState::check_conservation`] confirms the pools still
//! add up to the ward populations.

pub mod error;
pub mod pool;
pub mod seeds;
pub mod state;


pub use error::{ConsistencyError, SeedError, SeedResult};
pub use pool::{InfectionPool, Pool};
pub use seeds::{read_done_file, read_done_reader, ImportSeeder, SeedRecord, SeedSchedule};
pub use state::{InfectionState, StateDump, WardDump};

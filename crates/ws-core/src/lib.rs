//! `ws-core`: foundational types for the `wardsim` epidemic engine.
//!
//! This crate is a dependency of every other `ws-*` crate.  It has no `ws-*`
//! dependencies.
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`ids`]     | `WardId`, `StageId`                                       |
//! | [`time`]    | `Day`, `SimConfig`                                        |
//! | [`rng`]     | `RandomStream` (master), `WardStream` (per ward), `Sampler` |
//! | [`disease`] | `Disease`, `StageParams`                                  |
//! | [`params`]  | `Parameters`, `ParameterSet`, policy enums, `InputFiles`  |
//! | [`error`]   | `DataError`, `DataResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids and configuration.   |

pub mod disease;
pub mod error;
pub mod ids;
pub mod params;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use disease::{Disease, StageParams};
pub use error::{DataError, DataResult};
pub use ids::{StageId, WardId};
pub use params::{InputFiles, MovementRounding, ParameterSet, Parameters, SeedPolicy};
pub use rng::{RandomStream, Sampler, WardStream};
pub use time::{Day, SimConfig};

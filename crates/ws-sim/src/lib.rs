//! `ws-sim`: day loop orchestrator for the wardsim epidemic engine.
//!
//! # Day loop
//!
//! ```text
//! for day in 0..config.max_days:
//!   ⓪ Dawn            clone the stage counts.
//!   ① Seeds           apply the seed schedule for this day.
//!   ② Imports         Poisson arrivals per ward (master stream).
//!   ③ Transmission    force of infection from dawn counts; new infections
//!                     ~ Binomial(susceptible, 1 − e^−λ) per ward and pool.
//!   ④ Progression     Binomial(dawn count, progress) per stage.
//!                     ③ and ④ run per ward on a WardStream derived from one
//!                     master-stream day seed (parallel with `parallel`).
//!   ⑤ Apply & check   write back in ascending WardId order; verify
//!                     conservation; emit a DayRecord.
//!   stop early if nobody is infected, imports are off and no seed remains.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Runs phases ③–④ on a Rayon pool (`SimConfig::num_threads`). |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ws_core::{Parameters, RandomStream, SimConfig};
//! use ws_sim::{NoopObserver, SimBuilder};
//!
//! let mut rng = RandomStream::new(15324);
//! let mut sim = SimBuilder::new(Parameters::default())
//!     .network(network)
//!     .initialise(&mut rng)?
//!     .seeds(records)?
//!     .build(SimConfig::default(), rng)?;
//! let summary = sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod record;
pub mod sim;
mod transmission;


pub use builder::{Configure, Initialised, Networked, SimBuilder};
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use record::{DayRecord, RunOutput, RunSummary, StopReason};
pub use sim::{Days, Sim};

//! `ws-movement`: where the two pools go by day, and how they rebalance.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`play`]   | `PlayMatrix`, `PlayShare`, `rescale_play_matrix`           |
//! | [`engine`] | `MovementEngine`, `MovementReport`, `move_population`      |
//!
//! # Movement model
//!
//! Nobody changes ward.  The home pool spends the day at its work
//! destinations and the play pool at its play destinations; both sleep at
//! home.  "Movement" in this crate means two things:
//!
//! 1. [`rescale_play_matrix`] turns raw play link weights into daytime
//!    destination fractions, forcing a `static_play_at_home` share to stay in
//!    the home ward.
//! 2. [`move_population`] shifts people between a ward's home and play pools
//!    (`play_to_work`, `work_to_play`), stage by stage, conserving the ward
//!    total.

pub mod engine;
pub mod play;

#[cfg(test)]
mod tests;

pub use engine::{move_population, MovementEngine, MovementReport};
pub use play::{rescale_play_matrix, PlayMatrix, PlayShare};

//! `ws-network`: the ward graph for `wardsim`.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                 |
//! |-------------|----------------------------------------------------------|
//! | [`network`] | `Ward`, `Link`, `LinkKind`, `LinkTable`, `WardNetwork`, `WardNetworkBuilder` |
//! | [`loader`]  | CSV wards/links loader, `WardNetwork::build`             |
//!
//! # Building a network
//!
//! ```rust,ignore
//! let mut b = WardNetworkBuilder::new();
//! let home = b.add_ward(5_000, Some((0.0, 0.0)));
//! let town = b.add_ward(20_000, Some((2.0, 0.0)));
//! b.add_work_link(home, town, 1_200.0);
//! b.add_play_link(home, home, 1.0);
//! let network = b.build()?;
//! ```
//!
//! The network is immutable once built.  Everything that depends on a run's
//! parameters (the rescaled play matrix, the distance cutoff) is computed
//! elsewhere as a separate value.

pub mod loader;
pub mod network;

#[cfg(test)]
mod tests;

pub use loader::{load_network_csv, load_network_reader, read_table};
pub use network::{Link, LinkKind, LinkTable, Ward, WardNetwork, WardNetworkBuilder};

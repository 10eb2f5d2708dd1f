//! `ws-output`: simulation output writers for the wardsim engine.
//!
//! Three backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                                                             |
//! |-----------|---------|---------------------------------------------------------------------------|
//! | *(none)*  | CSV     | `day_summaries.csv`, `stage_totals.csv`, `ward_snapshots.csv`             |
//! | `sqlite`  | SQLite  | `output.db`                                                               |
//! | `parquet` | Parquet | `day_summaries.parquet`, `stage_totals.parquet`, `ward_snapshots.parquet` |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `ws_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ws_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{DaySummaryRow, StageTotalRow, WardSnapshotRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetWriter;

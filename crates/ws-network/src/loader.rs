//! CSV network loader.
//!
//! # CSV format
//!
//! Two tables.  Wards, one row per ward, ids contiguous from 0:
//!
//! ```csv
//! ward,population,name,x,y
//! 0,1000,Ambridge,0.0,0.0
//! 1,2500,Borchester,3.0,4.0
//! ```
//!
//! `name`, `x` and `y` are optional columns.  A ward either has both
//! coordinates or neither.
//!
//! Links, one row per directed link:
//!
//! ```csv
//! from,to,weight,kind,distance
//! 0,1,120,work,
//! 1,0,3.5,play,4.2
//! ```
//!
//! **`kind`** is `work` or `play`.  An empty or missing `distance` is derived
//! from the ward coordinates.

use std::io::Read;
use std::path::Path;

use log::debug;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use ws_core::{DataError, DataResult, Parameters, WardId};

use crate::{LinkKind, WardNetwork, WardNetworkBuilder};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct WardRecord {
    ward:       u32,
    population: i64,
    #[serde(default)]
    name:       Option<String>,
    #[serde(default)]
    x:          Option<f64>,
    #[serde(default)]
    y:          Option<f64>,
}

#[derive(Deserialize)]
struct LinkRecord {
    from:     u32,
    to:       u32,
    weight:   f64,
    kind:     String,
    #[serde(default)]
    distance: Option<f64>,
}

// ── Public API ────────────────────────────────────────────────────────────────

impl WardNetwork {
    /// Load the network named by `params.input_files`.
    pub fn build(params: &Parameters) -> DataResult<Self> {
        load_network_csv(&params.input_files.wards, &params.input_files.links)
    }

    /// Load from in-memory or streamed tables.
    pub fn from_readers<W: Read, L: Read>(wards: W, links: L) -> DataResult<Self> {
        load_network_reader(wards, links)
    }
}

/// Load a [`WardNetwork`] from a wards table and a links table on disk.
pub fn load_network_csv(wards: &Path, links: &Path) -> DataResult<WardNetwork> {
    let wards_file = std::fs::File::open(wards)?;
    let links_file = std::fs::File::open(links)?;
    load_network_reader(wards_file, links_file)
}

/// Like [`load_network_csv`] but accepts any `Read` sources.
///
/// # Errors
///
/// - [`DataError::RowShape`] for a row with the wrong number of fields.
/// - [`DataError::NonContiguousWards`] when ward ids are not exactly `0..N`.
/// - [`DataError::NegativePopulation`] for a negative population.
/// - [`DataError::UnknownWard`] for a link endpoint outside `0..N`.
/// - [`DataError::InvalidLink`] for a bad weight or distance.
pub fn load_network_reader<W: Read, L: Read>(wards: W, links: L) -> DataResult<WardNetwork> {
    let mut ward_rows: Vec<WardRecord> = read_table("wards", wards)?;
    ward_rows.sort_by_key(|r| r.ward);

    let link_rows: Vec<LinkRecord> = read_table("links", links)?;

    let mut builder = WardNetworkBuilder::with_capacity(ward_rows.len(), link_rows.len());

    for (expected, row) in ward_rows.iter().enumerate() {
        if row.ward as usize != expected {
            return Err(DataError::NonContiguousWards {
                expected: expected as u32,
                found:    row.ward,
            });
        }
        if row.population < 0 {
            return Err(DataError::NegativePopulation {
                ward:       WardId(row.ward),
                population: row.population,
            });
        }
        let position = match (row.x, row.y) {
            (Some(x), Some(y)) => Some((x, y)),
            (None, None) => None,
            _ => {
                return Err(DataError::invalid(
                    "x,y",
                    row.ward,
                    "ward has only one of its two coordinates",
                ));
            }
        };
        let population = row.population as u64;
        match row.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => builder.add_named_ward(name, population, position),
            None => builder.add_ward(population, position),
        };
    }

    for row in link_rows {
        let kind = match row.kind.to_ascii_lowercase().as_str() {
            "work" => LinkKind::Work,
            "play" => LinkKind::Play,
            other => return Err(DataError::invalid("kind", other, "expected work or play")),
        };
        builder.add_link(kind, WardId(row.from), WardId(row.to), row.weight, row.distance);
    }

    debug!(
        "parsed {} ward rows and {} link rows",
        builder.ward_count(),
        builder.link_count()
    );
    builder.build()
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Read every row of a headed CSV table into `T`, reporting short or long
/// rows as [`DataError::RowShape`] rather than a bare CSV error.
pub fn read_table<T: DeserializeOwned, R: Read>(what: &'static str, reader: R) -> DataResult<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        if record.len() != headers.len() {
            return Err(DataError::RowShape {
                what,
                row:      i + 1,
                expected: headers.len(),
                got:      record.len(),
            });
        }
        rows.push(record.deserialize(Some(&headers))?);
    }
    Ok(rows)
}

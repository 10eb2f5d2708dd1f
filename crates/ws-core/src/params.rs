//! Run parameters.
//!
//! # Two types, one transition
//!
//! [`Parameters`] is a plain struct with named, typed, `pub` fields.  The
//! orchestrator loads it, reads a line of the parameter file onto it, and
//! adjusts whatever depends on the network (the distance cutoff, for
//! instance).  [`Parameters::finalize`] validates it and returns a
//! [`ParameterSet`], which only hands out shared references.  Everything
//! downstream of the network takes `&ParameterSet`, so nothing can change a
//! parameter once the infection state exists.
//!
//! # Parameter file
//!
//! A CSV file with a header row.  Each data row is one parameter set and is
//! selected by its 0-based line index:
//!
//! ```csv
//! beta[2],beta[3],progress[1],progress[2],progress[3],too_ill_to_move[3],length_day
//! 0.95,0.50,0.1923,0.5,0.2,0.8,0.7
//! 0.90,0.45,0.1923,0.5,0.2,0.8,0.7
//! ```
//!
//! Column names are either scalar field names (`length_day`, `uv`,
//! `home_fraction`, …) or indexed disease fields `beta[i]`, `progress[i]`,
//! `too_ill_to_move[i]` where `i` is the disease stage (1-based).

use std::io::Read;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use log::debug;

use crate::{DataError, DataResult, Disease};

// ── Policy switches ───────────────────────────────────────────────────────────

/// How fractional head counts are turned into whole people when moving
/// population between pools.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MovementRounding {
    /// Round down.  Consumes no random draws.
    Deterministic,
    /// Round down, then add one with probability equal to the remainder.
    #[default]
    Stochastic,
}

/// What to do with seed records that cannot be applied as written.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeedPolicy {
    /// Unknown wards and over-sized seeds are errors.
    #[default]
    Strict,
    /// Unknown wards are skipped with a warning; over-sized seeds are clamped.
    Lenient,
}

// ── InputFiles ────────────────────────────────────────────────────────────────

/// Locations of the tables the network and seed loaders read.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputFiles {
    pub wards: PathBuf,
    pub links: PathBuf,
    pub seeds: Option<PathBuf>,
}

impl InputFiles {
    /// Standard layout: `wards.csv`, `links.csv` and (if present)
    /// `seeds.csv` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        let seeds = dir.join("seeds.csv");
        Self {
            wards: dir.join("wards.csv"),
            links: dir.join("links.csv"),
            seeds: seeds.exists().then_some(seeds),
        }
    }

    /// Standard layout inside the `index`-th subdirectory of `root`, with
    /// subdirectories ordered by name.
    pub fn select(root: &Path, index: usize) -> DataResult<Self> {
        let mut dirs = Vec::new();
        for entry in std::fs::read_dir(root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
        let available = dirs.len();
        dirs.get(index).map(|dir| Self::in_dir(dir)).ok_or_else(|| {
            DataError::invalid(
                "input files",
                index,
                format!("{} has {available} data sets", root.display()),
            )
        })
    }
}

// ── Parameters ────────────────────────────────────────────────────────────────

/// Mutable parameter record.  See the module docs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parameters {
    pub disease: Disease,
    pub input_files: InputFiles,
    /// Share of daily exposure that happens at the daytime location.
    pub length_day: f64,
    /// Seasonal multiplier applied to every stage's beta.
    pub uv: f64,
    /// Share of each ward's residents placed in the home (commuting) pool.
    pub home_fraction: f64,
    /// Links longer than this are treated as "stays home".
    pub dyn_dist_cutoff: f64,
    /// Share of every play pool that always plays in its own ward.
    pub static_play_at_home: f64,
    /// Fraction of each play pool moved into the home pool.
    pub play_to_work: f64,
    /// Fraction of each home pool moved into the play pool.
    pub work_to_play: f64,
    /// Expected number of imported infections per day, network-wide.
    pub daily_imports: f64,
    pub movement_rounding: MovementRounding,
    pub seed_policy: SeedPolicy,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            disease:             Disease::ncov(),
            input_files:         InputFiles::default(),
            length_day:          0.7,
            uv:                  1.0,
            home_fraction:       0.5,
            dyn_dist_cutoff:     f64::INFINITY,
            static_play_at_home: 0.0,
            play_to_work:        0.0,
            work_to_play:        0.0,
            daily_imports:       0.0,
            movement_rounding:   MovementRounding::default(),
            seed_policy:         SeedPolicy::default(),
        }
    }
}

impl Parameters {
    /// Defaults with the named disease preset.
    pub fn for_disease(name: &str) -> DataResult<Self> {
        Ok(Self { disease: Disease::preset(name)?, ..Self::default() })
    }

    /// Set one parameter by its file column name.
    pub fn set(&mut self, name: &str, value: &str) -> DataResult<()> {
        let name = name.trim();
        let value = value.trim();

        if let Some((field, rest)) = name.split_once('[') {
            let stage = rest
                .strip_suffix(']')
                .and_then(|i| i.trim().parse::<usize>().ok())
                .ok_or_else(|| DataError::UnknownParameter(name.to_owned()))?;
            let n_stages = self.disease.stages.len();
            if stage == 0 || stage > n_stages {
                return Err(DataError::invalid(
                    name,
                    stage,
                    format!("disease stages are numbered 1..={n_stages}"),
                ));
            }
            let x = parse_f64(name, value)?;
            let params = &mut self.disease.stages[stage - 1];
            match field.trim() {
                "beta" => params.beta = x,
                "progress" => params.progress = x,
                "too_ill_to_move" => params.too_ill_to_move = x,
                _ => return Err(DataError::UnknownParameter(name.to_owned())),
            }
            return Ok(());
        }

        match name {
            "length_day" => self.length_day = parse_f64(name, value)?,
            "uv" | "UV" => self.uv = parse_f64(name, value)?,
            "home_fraction" => self.home_fraction = parse_f64(name, value)?,
            "dyn_dist_cutoff" => self.dyn_dist_cutoff = parse_f64(name, value)?,
            "static_play_at_home" => self.static_play_at_home = parse_f64(name, value)?,
            "play_to_work" => self.play_to_work = parse_f64(name, value)?,
            "work_to_play" => self.work_to_play = parse_f64(name, value)?,
            "daily_imports" => self.daily_imports = parse_f64(name, value)?,
            // Replaces every stage, so it must precede any `beta[i]` column.
            "disease" => self.disease = Disease::preset(value)?,
            "movement_rounding" => {
                self.movement_rounding = match value.to_ascii_lowercase().as_str() {
                    "deterministic" => MovementRounding::Deterministic,
                    "stochastic" => MovementRounding::Stochastic,
                    _ => return Err(DataError::invalid(name, value, "expected deterministic or stochastic")),
                }
            }
            "seed_policy" => {
                self.seed_policy = match value.to_ascii_lowercase().as_str() {
                    "strict" => SeedPolicy::Strict,
                    "lenient" => SeedPolicy::Lenient,
                    _ => return Err(DataError::invalid(name, value, "expected strict or lenient")),
                }
            }
            _ => return Err(DataError::UnknownParameter(name.to_owned())),
        }
        Ok(())
    }

    /// Apply data row `line` (0-based) of the parameter file at `path`.
    pub fn read_file(&mut self, path: &Path, line: usize) -> DataResult<()> {
        let file = std::fs::File::open(path)?;
        self.read_reader(file, line)
    }

    /// Like [`read_file`](Self::read_file) but accepts any `Read` source.
    pub fn read_reader<R: Read>(&mut self, reader: R, line: usize) -> DataResult<()> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);
        let headers = rdr.headers()?.clone();

        let mut available = 0;
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            available += 1;
            if i != line {
                continue;
            }
            for (name, value) in headers.iter().zip(record.iter()) {
                if value.is_empty() {
                    continue;
                }
                self.set(name, value)?;
            }
            debug!("applied parameter line {line} ({} columns)", headers.len());
            return Ok(());
        }
        Err(DataError::LineOutOfRange { line, available })
    }

    /// Validate and freeze.
    pub fn finalize(self) -> DataResult<ParameterSet> {
        self.disease.validate()?;
        for (field, x) in [
            ("length_day", self.length_day),
            ("home_fraction", self.home_fraction),
            ("static_play_at_home", self.static_play_at_home),
            ("play_to_work", self.play_to_work),
            ("work_to_play", self.work_to_play),
        ] {
            if !(0.0..=1.0).contains(&x) {
                return Err(DataError::invalid(field, x, "must be within [0, 1]"));
            }
        }
        if !self.uv.is_finite() || self.uv < 0.0 {
            return Err(DataError::invalid("uv", self.uv, "must be a finite non-negative scale"));
        }
        if !self.daily_imports.is_finite() || self.daily_imports < 0.0 {
            return Err(DataError::invalid(
                "daily_imports",
                self.daily_imports,
                "must be a finite non-negative rate",
            ));
        }
        if self.dyn_dist_cutoff.is_nan() || self.dyn_dist_cutoff <= 0.0 {
            return Err(DataError::invalid("dyn_dist_cutoff", self.dyn_dist_cutoff, "must be positive"));
        }
        Ok(ParameterSet(self))
    }
}

fn parse_f64(field: &str, value: &str) -> DataResult<f64> {
    value
        .parse::<f64>()
        .map_err(|e| DataError::invalid(field, value, e.to_string()))
}

// ── ParameterSet ──────────────────────────────────────────────────────────────

/// Validated, read-only parameters.
///
/// Fields are read through `Deref` (`params.daily_imports`); there is no
/// mutable access.  Use [`to_parameters`](Self::to_parameters) to start a
/// modified copy for another run.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSet(Parameters);

impl ParameterSet {
    pub fn to_parameters(&self) -> Parameters {
        self.0.clone()
    }
}

impl Deref for ParameterSet {
    type Target = Parameters;

    #[inline]
    fn deref(&self) -> &Parameters {
        &self.0
    }
}

//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `day_summaries`, `stage_totals` and `ward_snapshots`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::{OutputWriter, ensure_dir};
use crate::{DaySummaryRow, OutputResult, StageTotalRow, WardSnapshotRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        ensure_dir(dir)?;

        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS day_summaries (
                 day            INTEGER PRIMARY KEY,
                 susceptible    INTEGER NOT NULL,
                 infected       INTEGER NOT NULL,
                 removed        INTEGER NOT NULL,
                 new_infections INTEGER NOT NULL,
                 seeded         INTEGER NOT NULL,
                 imported       INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS stage_totals (
                 day   INTEGER NOT NULL,
                 stage INTEGER NOT NULL,
                 count INTEGER NOT NULL,
                 PRIMARY KEY (day, stage)
             );
             CREATE TABLE IF NOT EXISTS ward_snapshots (
                 day   INTEGER NOT NULL,
                 ward  INTEGER NOT NULL,
                 pool  TEXT    NOT NULL,
                 stage INTEGER NOT NULL,
                 count INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_day_summary(&mut self, row: &DaySummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO day_summaries \
             (day, susceptible, infected, removed, new_infections, seeded, imported) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                row.day,
                row.susceptible,
                row.infected,
                row.removed,
                row.new_infections,
                row.seeded,
                row.imported,
            ],
        )?;
        Ok(())
    }

    fn write_stage_totals(&mut self, rows: &[StageTotalRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO stage_totals (day, stage, count) VALUES (?1, ?2, ?3)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![row.day, row.stage, row.count])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_ward_snapshot(&mut self, rows: &[WardSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO ward_snapshots (day, ward, pool, stage, count) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.day,
                    row.ward,
                    row.pool.as_str(),
                    row.stage,
                    row.count,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
